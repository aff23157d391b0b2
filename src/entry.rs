//! Entries as they come out of a walk.

use std::{
    fmt, io,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use log::debug;
use tar::{EntryType, Header};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Contains the target of the link
    Symlink(String),
    /// Contains the path of the entry this one links to
    Hardlink(String),
    /// FIFOs, devices and anything else; carries the raw tar type flag
    Other(u8),
}

/// The file-info record of an entry, decoded from its tar header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub size: u64,
    pub mode: u32,
    /// Seconds since the epoch
    pub mtime: u64,
    pub uid: u64,
    pub gid: u64,
    pub kind: EntryKind,
}

impl EntryInfo {
    /// Decodes the header of a tar entry.  `link_name` is the (possibly PAX or GNU long) link
    /// target as resolved by the tar decoder.
    pub(crate) fn from_header(header: &Header, link_name: Option<String>) -> io::Result<Self> {
        let entry_type = header.entry_type();
        let kind = match (entry_type, link_name) {
            (EntryType::Regular | EntryType::Continuous, _) => EntryKind::File,
            (EntryType::Directory, _) => EntryKind::Directory,
            (EntryType::Symlink, Some(target)) => EntryKind::Symlink(target),
            (EntryType::Link, Some(target)) => EntryKind::Hardlink(target),
            (EntryType::Symlink | EntryType::Link, None) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "link entry without a target",
                ))
            }
            (other, _) => EntryKind::Other(other.as_byte()),
        };

        Ok(EntryInfo {
            size: header.size()?,
            mode: or_zero(header.mode(), "mode"),
            mtime: or_zero(header.mtime(), "mtime"),
            uid: or_zero(header.uid(), "uid"),
            gid: or_zero(header.gid(), "gid"),
            kind,
        })
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn modified(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.mtime)
    }
}

/// Blank or garbled metadata fields read as 0, as tar(1) does; only the size matters for decoding.
fn or_zero<T: Default>(field: io::Result<T>, name: &str) -> T {
    field.unwrap_or_else(|err| {
        debug!("unreadable {name} in tar header, using 0: {err}");
        T::default()
    })
}

/// One entry of an archive, with its content fully read into memory.
#[derive(Debug)]
pub struct ArchiveEntry {
    /// The name exactly as stored in the archive (not normalised)
    pub path: String,
    pub info: EntryInfo,
    pub content: Vec<u8>,
    /// Set if reading the content failed part way; `content` then holds whatever was read
    pub read_error: Option<io::Error>,
}

impl fmt::Display for ArchiveEntry {
    /// A `ls -l`-like line: mode, owner, size, mtime, path and link target.
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let info = &self.info;
        let type_char = match info.kind {
            EntryKind::File => '-',
            EntryKind::Directory => 'd',
            EntryKind::Symlink(_) => 'l',
            EntryKind::Hardlink(_) => 'h',
            EntryKind::Other(_) => '?',
        };
        write!(
            fmt,
            "{type_char}{:04o} {}/{} {:>10} {:>10} {}",
            info.mode & 0o7777,
            info.uid,
            info.gid,
            info.size,
            info.mtime,
            self.path
        )?;
        match info.kind {
            EntryKind::Symlink(ref target) => write!(fmt, " -> {target}"),
            EntryKind::Hardlink(ref target) => write!(fmt, " link to {target}"),
            _ => Ok(()),
        }
    }
}
