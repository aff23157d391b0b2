//! Read the files inside gzip- or bzip2-compressed tar archives without extracting them.
//!
//! The entry point is [`ArchiveReader`], constructed for one compression codec and then consumed
//! by one of its walks or by [`ArchiveReader::get_file`].

pub mod compression;
pub mod entry;
pub mod error;
pub mod path;
pub mod reader;
mod util;


pub use compression::Compression;
pub use entry::{ArchiveEntry, EntryInfo, EntryKind};
pub use error::{ArchiveError, Result};
pub use path::PrefixMatch;
pub use reader::{open, open_with, ArchiveReader, Entries};
