//! Path normalization and resolution.

use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::Serializer;

use crate::error::ScanError;

/// Make a path absolute and lexically remove `.` and `..` components.
///
/// Symlinks are not resolved. If the current directory cannot be read the
/// path is cleaned as given.
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

    let mut cleaned = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` on a bare root is a no-op, which is what `/..` means.
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Resolve `path` to its canonical form, following symlinks.
pub fn resolve_path(path: impl AsRef<Path>) -> Result<PathBuf, ScanError> {
    let path = path.as_ref();
    fs::canonicalize(path).map_err(|e| ScanError::io(path, e))
}

/// Resolve a scan root, which must be an existing directory.
pub fn resolve_root(path: impl AsRef<Path>) -> Result<PathBuf, ScanError> {
    let resolved = resolve_path(path)?;
    if !resolved.is_dir() {
        return Err(ScanError::NotADirectory { path: resolved });
    }
    Ok(resolved)
}

/// Serialize a path as a string, replacing invalid UTF-8 with U+FFFD.
///
/// Exports must not fail because one file name is not valid UTF-8.
pub(crate) fn serialize_lossy<S: Serializer>(
    path: &Path,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}
