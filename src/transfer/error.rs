// ABOUTME: Error types for file transfers.
// ABOUTME: Each filesystem failure keeps the path involved and the underlying I/O error.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("file or directory does not exist: {pattern}")]
    NotFound { pattern: String },

    #[error("invalid glob pattern {pattern}: {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("failed to start SFTP session: {0}")]
    Session(String),

    #[error("failed to stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {path}: {source}")]
    Mkdir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TransferError {
    /// The underlying I/O error, for failures that have one.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            TransferError::Stat { source, .. }
            | TransferError::ReadDir { source, .. }
            | TransferError::Open { source, .. }
            | TransferError::Read { source, .. }
            | TransferError::Create { source, .. }
            | TransferError::Write { source, .. }
            | TransferError::Mkdir { source, .. } => Some(source),
            TransferError::NotFound { .. }
            | TransferError::Pattern { .. }
            | TransferError::Session(_) => None,
        }
    }

    /// The path the failure happened on, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            TransferError::Stat { path, .. }
            | TransferError::ReadDir { path, .. }
            | TransferError::Open { path, .. }
            | TransferError::Read { path, .. }
            | TransferError::Create { path, .. }
            | TransferError::Write { path, .. }
            | TransferError::Mkdir { path, .. } => Some(path),
            _ => None,
        }
    }
}
