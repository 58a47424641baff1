//! Scan configuration types.

use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::entry::SortOrder;

/// Default number of entries that count as one percent of heuristic progress.
pub const DEFAULT_ENTRIES_PER_PERCENT: u64 = 10;

/// Default bound on concurrent directory size computations.
pub const DEFAULT_SIZE_WORKERS: usize = 4;

/// How scan progress percentages are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ProgressMode {
    /// `entries_processed / entries_per_percent`, capped at 100. Reaching
    /// 100 with directories still queued forces completion.
    Heuristic { entries_per_percent: u64 },
    /// Count every entry up front, then report an exact fraction. Never
    /// forces completion.
    Exact,
}

impl Default for ProgressMode {
    fn default() -> Self {
        ProgressMode::Heuristic {
            entries_per_percent: DEFAULT_ENTRIES_PER_PERCENT,
        }
    }
}

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Absolute paths that are never entered or reported.
    #[builder(default)]
    #[serde(default)]
    pub denylist: Vec<PathBuf>,

    /// Also skip the current user's cache directory.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub deny_user_cache: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "false")]
    #[serde(default)]
    pub include_hidden: bool,

    /// Progress model.
    #[builder(default)]
    #[serde(default)]
    pub progress: ProgressMode,

    /// Concurrent directory size computations (0 or 1 = inline).
    #[builder(default = "DEFAULT_SIZE_WORKERS")]
    #[serde(default = "default_size_workers")]
    pub size_workers: usize,

    /// Ordering of each children list.
    #[builder(default)]
    #[serde(default)]
    pub sort: SortOrder,
}

fn default_true() -> bool {
    true
}

fn default_size_workers() -> usize {
    DEFAULT_SIZE_WORKERS
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if let Some(ProgressMode::Heuristic {
            entries_per_percent: 0,
        }) = self.progress
        {
            return Err("entries_per_percent must be at least 1".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a simple config for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            denylist: Vec::new(),
            deny_user_cache: true,
            include_hidden: false,
            progress: ProgressMode::default(),
            size_workers: DEFAULT_SIZE_WORKERS,
            sort: SortOrder::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
