//! Error types for message construction.

use std::io;
use std::path::PathBuf;

/// Result type alias for message operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error while reading attachment content.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attachment file could not be read.
    #[error("Cannot read attachment {path}: {source}")]
    Attachment {
        /// Path that was supplied.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Attachment path has no usable file name.
    #[error("Attachment path has no file name: {0}")]
    MissingFileName(PathBuf),
}
