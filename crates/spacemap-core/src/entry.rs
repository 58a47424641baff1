//! Scanned filesystem entries.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// One file or directory discovered under a scanned directory.
///
/// Entries are immutable once recorded: a directory's `size` is the
/// recursive total measured at the moment its parent was listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Base name (not full path).
    pub name: CompactString,

    /// Absolute, normalized path.
    #[serde(serialize_with = "crate::path::serialize_lossy")]
    pub path: PathBuf,

    /// Size in bytes (recursive total for directories).
    pub size: u64,

    /// Whether the entry itself is a directory. Symlinks are never
    /// directories, whatever they point at.
    pub is_dir: bool,
}

impl Entry {
    /// Create a new file entry.
    pub fn file(name: impl Into<CompactString>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            is_dir: false,
        }
    }

    /// Create a new directory entry.
    pub fn directory(name: impl Into<CompactString>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size,
            is_dir: true,
        }
    }

    /// Build an entry from a full path, taking the base name from its last
    /// component.
    pub fn from_path(path: impl Into<PathBuf>, size: u64, is_dir: bool) -> Self {
        let path = path.into();
        let name = entry_name(&path);
        Self {
            name,
            path,
            size,
            is_dir,
        }
    }

    /// Check if this entry is hidden (dot-prefixed name).
    pub fn is_hidden(&self) -> bool {
        is_hidden_name(&self.name)
    }
}

/// Ordering applied to each children list.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SortOrder {
    /// Largest first, ties broken by name.
    #[default]
    SizeDescending,
    /// Alphabetical by name.
    Name,
    /// Whatever order the OS listed the entries in.
    Listing,
}

impl SortOrder {
    /// Sort a children list in place.
    pub fn apply(self, entries: &mut [Entry]) {
        match self {
            SortOrder::SizeDescending => entries.sort_by(by_size_descending),
            SortOrder::Name => entries.sort_by(|a, b| a.name.cmp(&b.name)),
            SortOrder::Listing => {}
        }
    }
}

fn by_size_descending(a: &Entry, b: &Entry) -> Ordering {
    b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name))
}

/// Check if a base name denotes a hidden entry.
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Base name of a path, falling back to the whole path for roots like `/`.
pub fn entry_name(path: &Path) -> CompactString {
    path.file_name()
        .map(|n| CompactString::new(n.to_string_lossy()))
        .unwrap_or_else(|| CompactString::new(path.to_string_lossy()))
}
