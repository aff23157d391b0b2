//! Streaming traversal of compressed tar archives.
//!
//! An [`ArchiveReader`] wraps exactly one input stream.  Tar streams can only be decoded front to
//! back, so every traversal consumes the reader: one handle, one pass.  The walks hand each
//! entry to a visitor with its content already read into memory, in the order the entries are
//! stored in the archive.
//!
//! ```no_run
//! let content = tarwalk::open("release.tar.gz")?.get_file("etc/os-release")?;
//! # Ok::<(), tarwalk::ArchiveError>(())
//! ```

use std::{
    fs::File,
    io::{self, Read},
    iter::FusedIterator,
    path::Path,
};

use log::{debug, trace};

use crate::{
    compression::{Compression, Decompressor},
    entry::{ArchiveEntry, EntryInfo},
    error::{ArchiveError, Result},
    path::{clean, PrefixMatch},
};

/// Upper bound on the buffer reserved up front for an entry's content.  The size in the header
/// is untrusted; larger entries still get read, the buffer just grows as they do.
const CONTENT_RESERVE_MAX: u64 = 1 << 20;

/// Opens the archive at `path`, guessing the compression from its suffix.
///
/// Fails with an [`io::ErrorKind::InvalidInput`] error if the suffix is not one of the known
/// gzip or bzip2 tarball suffixes.
pub fn open(path: impl AsRef<Path>) -> Result<ArchiveReader<File>> {
    let path = path.as_ref();
    let Some(compression) = Compression::from_path(path) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot tell the compression of {path:?} from its name"),
        )
        .into());
    };
    open_with(path, compression)
}

/// Opens the archive at `path` with an explicitly chosen compression.
pub fn open_with(path: impl AsRef<Path>, compression: Compression) -> Result<ArchiveReader<File>> {
    ArchiveReader::new(File::open(path)?, compression)
}

/// A single-pass reader over the entries of a gzip- or bzip2-compressed tar stream.
pub struct ArchiveReader<R: Read> {
    archive: tar::Archive<Decompressor<R>>,
    compression: Compression,
}

impl<R: Read> ArchiveReader<R> {
    /// Wraps `stream` in the decompressor for `compression` and a tar decoder.
    ///
    /// Both codecs are validated synchronously: if the stream does not start with the magic bytes
    /// of `compression` this fails with [`ArchiveError::Format`] before any entry is read.  Damage
    /// past the magic shows up as [`ArchiveError::Decode`] while walking.
    pub fn new(stream: R, compression: Compression) -> Result<Self> {
        let decompressor = Decompressor::new(stream, compression)?;
        debug!("opened {compression} compressed tar stream");
        Ok(ArchiveReader {
            archive: tar::Archive::new(decompressor),
            compression,
        })
    }

    /// Reader for a `.tgz` / `.tar.gz` stream.
    pub fn gzip(stream: R) -> Result<Self> {
        Self::new(stream, Compression::Gzip)
    }

    /// Reader for a `.tbz` / `.tbz2` / `.tb2` / `.tar.bz2` stream.
    pub fn bzip2(stream: R) -> Result<Self> {
        Self::new(stream, Compression::Bzip2)
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Returns an iterator over the entries, in archive order.
    ///
    /// The iterator stops after the first error it yields.  The tar decoder cannot restart, so
    /// calling this again after the stream has been advanced fails with
    /// [`ArchiveError::Decode`].
    pub fn entries(&mut self) -> Result<Entries<'_, R>> {
        let inner = self.archive.entries().map_err(ArchiveError::Decode)?;
        Ok(Entries { inner, done: false })
    }

    /// Visits every entry in archive order and returns how many were visited.
    ///
    /// If `visit` returns an error the walk stops right there and the error comes back as
    /// [`ArchiveError::CallbackAbort`].  If the archive is corrupt or truncated the walk stops
    /// with [`ArchiveError::Decode`].  Entries visited before either error are not undone.
    pub fn walk_all<F>(mut self, mut visit: F) -> Result<usize>
    where
        F: FnMut(ArchiveEntry) -> anyhow::Result<()>,
    {
        let mut visited = 0;

        for entry in self.entries()? {
            let entry = entry?;
            let path = entry.path.clone();
            trace!("visiting {path} ({} bytes)", entry.content.len());

            if let Err(source) = visit(entry) {
                debug!("walk aborted at {path} after {visited} entries");
                return Err(ArchiveError::CallbackAbort { path, source });
            }
            visited += 1;
        }

        debug!("walked {visited} entries");
        Ok(visited)
    }

    /// Visits the entries whose cleaned path starts with the cleaned `root`, and returns how many
    /// were visited.
    ///
    /// This is a string comparison: a root of `foo` also matches `foobar`.  Use
    /// [`walk_under`](Self::walk_under) to respect path segment boundaries.
    pub fn walk_prefix<F>(self, root: &str, visit: F) -> Result<usize>
    where
        F: FnMut(ArchiveEntry) -> anyhow::Result<()>,
    {
        self.walk_matching(root, PrefixMatch::String, visit)
    }

    /// Visits `root` itself and every entry below it (a root of `foo` does not match `foobar`).
    pub fn walk_under<F>(self, root: &str, visit: F) -> Result<usize>
    where
        F: FnMut(ArchiveEntry) -> anyhow::Result<()>,
    {
        self.walk_matching(root, PrefixMatch::Segment, visit)
    }

    /// Visits the entries that `mode` says are under `root`; the others are skipped silently.
    pub fn walk_matching<F>(self, root: &str, mode: PrefixMatch, mut visit: F) -> Result<usize>
    where
        F: FnMut(ArchiveEntry) -> anyhow::Result<()>,
    {
        let root = clean(root);
        let mut matched = 0;

        self.walk_all(|entry| {
            if !mode.matches(&root, &entry.path) {
                return Ok(());
            }
            matched += 1;
            visit(entry)
        })?;

        Ok(matched)
    }

    /// Returns the content of the entry at `path` (compared after cleaning both sides).
    ///
    /// The whole archive is always scanned: if the same path is stored more than once, the last
    /// copy wins, as it would when extracting.  Fails with [`ArchiveError::NotFound`] if nothing
    /// matched; errors from the walk itself take precedence.
    pub fn get_file(self, path: &str) -> Result<Vec<u8>> {
        let target = clean(path);
        let mut found = None;

        self.walk_all(|entry| {
            if clean(&entry.path) == target {
                trace!("found {target} as {}", entry.path);
                found = Some(entry.content);
            }
            Ok(())
        })?;

        found.ok_or_else(|| ArchiveError::NotFound(path.to_string()))
    }
}

/// Iterator over the entries of an [`ArchiveReader`], created by
/// [`ArchiveReader::entries`].
pub struct Entries<'a, R: 'a + Read> {
    inner: tar::Entries<'a, Decompressor<R>>,
    done: bool,
}

impl<'a, R: Read> Iterator for Entries<'a, R> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let item = match self.inner.next() {
            None => {
                self.done = true;
                return None;
            }
            Some(Ok(entry)) => read_entry(entry),
            Some(Err(err)) => Err(ArchiveError::Decode(err)),
        };

        if item.is_err() {
            self.done = true;
        }
        Some(item)
    }
}

impl<'a, R: Read> FusedIterator for Entries<'a, R> {}

fn read_entry<R: Read>(mut entry: tar::Entry<'_, Decompressor<R>>) -> Result<ArchiveEntry> {
    // entry.path() contains the untruncated path (GNU long names and PAX extensions applied),
    // while the raw header path is limited to 100 bytes
    let path = entry
        .path()
        .map_err(ArchiveError::Decode)?
        .to_string_lossy()
        .into_owned();
    let link_name = entry
        .link_name()
        .map_err(ArchiveError::Decode)?
        .map(|target| target.to_string_lossy().into_owned());

    let mut info =
        EntryInfo::from_header(entry.header(), link_name).map_err(ArchiveError::Decode)?;
    // PAX headers may override the size in the ustar header
    info.size = entry.size();

    let mut content = Vec::with_capacity(info.size.min(CONTENT_RESERVE_MAX) as usize);
    let read_error = match entry.read_to_end(&mut content) {
        // the tar decoder stops quietly at the end of the stream, even mid-entry
        Ok(_) if content.len() as u64 != info.size => Some(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "{path}: read {} of {} content bytes",
                content.len(),
                info.size
            ),
        )),
        Ok(_) => None,
        Err(err) => Some(err),
    };

    Ok(ArchiveEntry {
        path,
        info,
        content,
        read_error,
    })
}
