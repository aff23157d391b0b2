//! Error types for the tarwalk library.
//!
//! All fallible operations return a [`Result<T>`], an alias for
//! `Result<T, ArchiveError>`.
//!
//! # Error Categories
//!
//! - **Stream format**: [`Format`], raised when a constructor is handed a stream that does not
//!   start with the magic of the declared compression
//! - **Walking**: [`Decode`] (the tar decoder or the decompressor failed) and [`CallbackAbort`]
//!   (the visitor asked to stop)
//! - **Lookup**: [`NotFound`]
//! - **System errors**: [`Io`]
//!
//! [`Format`]: ArchiveError::Format
//! [`Decode`]: ArchiveError::Decode
//! [`CallbackAbort`]: ArchiveError::CallbackAbort
//! [`NotFound`]: ArchiveError::NotFound
//! [`Io`]: ArchiveError::Io

use crate::compression::Compression;

/// Result type alias for operations that may return an ArchiveError.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Error types for archive operations.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The stream is not valid in the declared compression format.
    #[error("stream is not in {0} format")]
    Format(Compression),

    /// The tar structure (or the compressed stream under it) is corrupt or truncated.
    #[error("walking error: {0}")]
    Decode(#[source] std::io::Error),

    /// The visitor returned an error for the entry at `path`.
    #[error("could not walk {path}: {source}")]
    CallbackAbort {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// No entry matched the requested path.
    #[error("file not found: {0}")]
    NotFound(String),

    /// I/O error outside of tar decoding (opening files, reading the compression header).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
