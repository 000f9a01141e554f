//! Disposal modes and per-item errors.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What happens to each removed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisposalMode {
    /// Unlink files, `rmdir` empty directories.
    Delete,
    /// Move items to the platform trash.
    Trash,
    /// Move items under `backup_dir`, keeping their path relative to `base`.
    Backup { backup_dir: PathBuf, base: PathBuf },
}

impl DisposalMode {
    /// Backup mode rooted at `backup_dir`, mirroring paths below `base`.
    pub fn backup(backup_dir: impl Into<PathBuf>, base: impl Into<PathBuf>) -> Self {
        Self::Backup {
            backup_dir: backup_dir.into(),
            base: base.into(),
        }
    }

    /// Past-tense verb for summaries.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Delete => "Deleted",
            Self::Trash => "Trashed",
            Self::Backup { .. } => "Backed up",
        }
    }
}

/// An item that could not be disposed of.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{}: {}", .path.display(), .message)]
pub struct OperationError {
    /// The path that caused the error.
    pub path: PathBuf,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}
