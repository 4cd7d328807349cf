//! Error types for the mediasift pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort an operation.
///
/// Per-file failures inside a batch are *not* represented here; they are
/// converted to [`FileError`] report entries at the component boundary so
/// that a single unreadable file never halts a multi-file batch.
#[derive(Debug, Error)]
pub enum Error {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation was cancelled before completion.
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid argument or configuration.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl Error {
    /// Create an I/O error with path context, classifying the common kinds.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Check if this error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A per-file failure surfaced in a batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileError {
    /// The path that caused the error.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl FileError {
    /// Create a new file error.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}
