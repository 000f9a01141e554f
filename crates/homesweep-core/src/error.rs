//! Scan failures and the non-fatal warnings collected alongside results.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a scan.
///
/// Per-entry problems never show up here; they are collected as
/// [`ScanWarning`]s and the walk carries on.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan root could not be read.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// The scan root does not exist.
    #[error("No such directory: {path}")]
    NotFound { path: PathBuf },

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cancel flag was raised mid-scan.
    #[error("Scan cancelled")]
    Interrupted,

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// A junk glob pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

impl ScanError {
    /// Wrap an I/O failure on `path`, keeping the common kinds distinct.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Whether this error is a user cancellation.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    PermissionDenied,
    /// A directory listing failed.
    ReadError,
    MetadataError,
    /// A duplicate candidate could not be fingerprinted.
    HashError,
}

/// An entry the scan had to skip. The entry is left out of every category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    pub path: PathBuf,
    pub message: String,
    pub kind: WarningKind,
}

impl ScanWarning {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    pub fn permission_denied(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Permission denied: {}", path.display()),
            path,
            kind: WarningKind::PermissionDenied,
        }
    }

    /// Stat failure. Permission errors get their own kind.
    pub fn metadata(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let path = path.into();
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            return Self::permission_denied(path);
        }
        Self {
            message: format!("Metadata error: {error}"),
            path,
            kind: WarningKind::MetadataError,
        }
    }

    /// Read failure while fingerprinting.
    pub fn hash_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self {
            path: path.into(),
            message: format!("Hash error: {error}"),
            kind: WarningKind::HashError,
        }
    }
}
