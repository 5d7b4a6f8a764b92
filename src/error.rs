//! Error types for a split job.
//!
//! Every variant is terminal for the job. Paths are carried so callers can
//! render a message without knowing which step failed.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    /// The input document does not exist.
    #[error("Input PDF not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The input document exists but could not be read or parsed.
    #[error("Failed to read PDF {}: {reason}. Check whether the file is corrupted", .path.display())]
    CorruptDocument { path: PathBuf, reason: String },

    /// An output document could not be written.
    #[error("Failed to write {} ({committed} file(s) already written): {source}", .path.display())]
    Write {
        path: PathBuf,
        committed: usize,
        #[source]
        source: std::io::Error,
    },

    /// The output name is taken and the job refuses to overwrite it.
    #[error("Output file already exists: {}", .path.display())]
    OutputExists { path: PathBuf },

    /// The manifest could not be persisted after all outputs were written.
    #[error("Failed to save manifest {}: {source}", .path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The job was cancelled between two group writes.
    #[error("Split cancelled after {committed} file(s) were written")]
    Cancelled { committed: usize },
}

pub type Result<T> = std::result::Result<T, SplitError>;
