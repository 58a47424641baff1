//! Core types for spacemap.
//!
//! This crate provides the data model shared by the scanner and its
//! consumers: scanned entries, the path-to-children result map,
//! configuration, and warning types.

mod config;
mod entry;
mod error;
mod format;
mod path;
mod result;

pub use config::{
    DEFAULT_ENTRIES_PER_PERCENT, DEFAULT_SIZE_WORKERS, ProgressMode, ScanConfig,
    ScanConfigBuilder,
};
pub use entry::{Entry, SortOrder, entry_name, is_hidden_name};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use format::format_size;
pub use path::{normalize_path, resolve_path, resolve_root};
pub use result::{Completion, ScanResult};
