//! Compression codecs understood by [`ArchiveReader`](crate::reader::ArchiveReader).
//!
//! Only tar streams wrapped in gzip or bzip2 are supported.  The caller always decides which
//! codec applies; [`Compression::from_path`] merely guesses from a file name for the benefit of
//! code that opens files by path.

use std::{
    fmt,
    io::{Chain, Cursor, Read},
    path::Path,
};

use bzip2::read::BzDecoder;
use flate2::read::MultiGzDecoder;

use crate::{
    error::{ArchiveError, Result},
    util::read_exactish,
};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
/// Long enough for the bzip2 magic plus its block size digit.
const MAGIC_MAX: usize = 4;

/// File name suffixes, longest first so `.tar.gz` wins over a bare `.gz` lookalike.
const SUFFIXES: &[(&str, Compression)] = &[
    (".tar.bz2", Compression::Bzip2),
    (".tar.gz", Compression::Gzip),
    (".tbz2", Compression::Bzip2),
    (".tbz", Compression::Bzip2),
    (".tb2", Compression::Bzip2),
    (".tgz", Compression::Gzip),
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Compression {
    Gzip,
    Bzip2,
}

impl Compression {
    /// The bytes every stream in this format starts with.
    pub fn magic(self) -> &'static [u8] {
        match self {
            Compression::Gzip => GZIP_MAGIC,
            Compression::Bzip2 => BZIP2_MAGIC,
        }
    }

    /// Guesses the compression from the file name suffix (`.tgz`, `.tar.gz`, `.tbz`, `.tbz2`,
    /// `.tb2`, `.tar.bz2`), ignoring case.  Returns None for anything else.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Compression> {
        let name = path.as_ref().file_name()?.to_string_lossy().to_ascii_lowercase();
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.len() > suffix.len() && name.ends_with(suffix))
            .map(|(_, compression)| *compression)
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Compression::Gzip => "gzip",
            Compression::Bzip2 => "bzip2",
        })
    }
}

/// The stream as it is handed to the decompressor: the sniffed magic bytes put back in front of
/// the rest of the input.
type Sniffed<R> = Chain<Cursor<Vec<u8>>, R>;

/// A decompressing reader for one of the supported codecs.
pub(crate) enum Decompressor<R: Read> {
    Gzip(MultiGzDecoder<Sniffed<R>>),
    Bzip2(BzDecoder<Sniffed<R>>),
}

impl<R: Read> Decompressor<R> {
    /// Checks that `stream` starts like a `compression` stream and wraps it in the matching
    /// decoder.
    ///
    /// For gzip the whole member header is parsed here; for bzip2 the magic and the block size
    /// digit are checked.  Damage past the header fails on read.
    pub(crate) fn new(mut stream: R, compression: Compression) -> Result<Self> {
        let mut magic = vec![0u8; MAGIC_MAX];
        let len = read_exactish(&mut stream, &mut magic)?;
        magic.truncate(len);

        if !magic.starts_with(compression.magic()) {
            return Err(ArchiveError::Format(compression));
        }

        let sniffed = Cursor::new(magic).chain(stream);
        match compression {
            Compression::Gzip => {
                // the decoder parses the member header as it is constructed
                let decoder = MultiGzDecoder::new(sniffed);
                if decoder.header().is_none() {
                    return Err(ArchiveError::Format(compression));
                }
                Ok(Decompressor::Gzip(decoder))
            }
            Compression::Bzip2 => {
                let level = sniffed.get_ref().0.get_ref().get(BZIP2_MAGIC.len()).copied();
                if !matches!(level, Some(b'1'..=b'9')) {
                    return Err(ArchiveError::Format(compression));
                }
                Ok(Decompressor::Bzip2(BzDecoder::new(sniffed)))
            }
        }
    }
}

impl<R: Read> Read for Decompressor<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Decompressor::Gzip(decoder) => decoder.read(buf),
            Decompressor::Bzip2(decoder) => decoder.read(buf),
        }
    }
}
