//! Error types for scanning operations.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced outside a running scan (configuration, root resolution).
///
/// A scan itself never fails; per-entry problems become [`ScanWarning`]s.
#[derive(Debug, Error)]
pub enum ScanError {
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
        source: io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Entry vanished between listing and reading it.
    NotFound,
    /// Symbolic link target does not exist.
    BrokenSymlink,
    /// Error listing a directory.
    ReadError,
    /// Error reading metadata.
    MetadataError,
}

impl WarningKind {
    /// Classify an I/O error, using `fallback` for anything that is
    /// neither a permission nor a not-found failure.
    pub fn classify(error: &io::Error, fallback: WarningKind) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => WarningKind::PermissionDenied,
            io::ErrorKind::NotFound => WarningKind::NotFound,
            _ => fallback,
        }
    }
}

/// Non-fatal warning encountered during scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    #[serde(serialize_with = "crate::path::serialize_lossy")]
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a broken symlink warning.
    pub fn broken_symlink(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("Broken symlink: {}", path.display()),
            path,
            kind: WarningKind::BrokenSymlink,
        }
    }

    /// Create a warning for a directory that could not be listed.
    pub fn read_error(path: impl Into<PathBuf>, error: &io::Error) -> Self {
        Self::from_io(path, error, WarningKind::ReadError)
    }

    /// Create a warning for an entry whose metadata could not be read.
    pub fn metadata_error(path: impl Into<PathBuf>, error: &io::Error) -> Self {
        Self::from_io(path, error, WarningKind::MetadataError)
    }

    fn from_io(path: impl Into<PathBuf>, error: &io::Error, fallback: WarningKind) -> Self {
        let kind = WarningKind::classify(error, fallback);
        let path = path.into();
        let message = match kind {
            WarningKind::PermissionDenied => format!("Permission denied: {}", path.display()),
            WarningKind::NotFound => format!("Vanished during scan: {}", path.display()),
            _ => format!("{kind}: {error}"),
        };
        Self {
            path,
            message,
            kind,
        }
    }
}
