//! Error types and load result structures for the descriptor loader.

use std::path::PathBuf;

use super::catalog::DescriptorKind;

/// Errors that can occur while loading descriptors.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Descriptor parse error.
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] racker_core::RackerError),

    /// Requested descriptor is not in the catalog.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: DescriptorKind, id: String },

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),
}

/// Result alias for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Outcome of loading a single descriptor file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Descriptor was successfully loaded.
    Loaded { kind: DescriptorKind, id: String },
    /// File was skipped (dotfile, wrong extension, etc.).
    Skipped { reason: String },
    /// Parse error occurred.
    Failed { error: String },
}
