//! User settings persisted as TOML in the platform config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use spacemap_scan::{DEFAULT_SIZE_WORKERS, ProgressMode, ScanConfig, ScanError, SortOrder};

/// Settings read from `<config_dir>/spacemap/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Extra paths never scanned.
    pub denylist: Vec<PathBuf>,
    /// Skip the current user's cache directory.
    pub deny_user_cache: bool,
    /// Concurrent directory size computations.
    pub size_workers: usize,
    /// Count entries first for exact progress.
    pub exact_progress: bool,
    /// Show dot-prefixed entries.
    pub include_hidden: bool,
    /// Ordering of each directory listing.
    pub sort: SortOrder,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            denylist: Vec::new(),
            deny_user_cache: true,
            size_workers: DEFAULT_SIZE_WORKERS,
            exact_progress: false,
            include_hidden: false,
            sort: SortOrder::default(),
        }
    }
}

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub exclude: Vec<PathBuf>,
    pub exact_progress: bool,
    pub workers: Option<usize>,
    pub hidden: bool,
    pub keep_cache: bool,
    pub sort: Option<SortOrder>,
}

impl Settings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("spacemap").join("config.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring malformed settings file");
                Self::default()
            }
        }
    }

    /// Build the scan configuration for `root`.
    pub fn scan_config(&self, root: &Path, overrides: &Overrides) -> Result<ScanConfig, ScanError> {
        let mut denylist = self.denylist.clone();
        denylist.extend(overrides.exclude.iter().cloned());

        let progress = if self.exact_progress || overrides.exact_progress {
            ProgressMode::Exact
        } else {
            ProgressMode::default()
        };

        ScanConfig::builder()
            .root(root)
            .denylist(denylist)
            .deny_user_cache(self.deny_user_cache && !overrides.keep_cache)
            .include_hidden(self.include_hidden || overrides.hidden)
            .progress(progress)
            .size_workers(overrides.workers.unwrap_or(self.size_workers))
            .sort(overrides.sort.unwrap_or(self.sort))
            .build()
            .map_err(|e| ScanError::InvalidConfig {
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file() {
        let settings: Settings = toml::from_str(
            r#"
            denylist = ["/mnt/backup"]
            exact_progress = true
            sort = "name"
            "#,
        )
        .unwrap();

        assert_eq!(settings.denylist, [PathBuf::from("/mnt/backup")]);
        assert!(settings.exact_progress);
        assert_eq!(settings.sort, SortOrder::Name);
        assert!(settings.deny_user_cache);
        assert_eq!(settings.size_workers, DEFAULT_SIZE_WORKERS);
    }

    #[test]
    fn test_overrides_win() {
        let settings = Settings {
            denylist: vec![PathBuf::from("/a")],
            size_workers: 2,
            ..Settings::default()
        };
        let overrides = Overrides {
            exclude: vec![PathBuf::from("/b")],
            exact_progress: true,
            workers: Some(1),
            hidden: true,
            keep_cache: true,
            sort: Some(SortOrder::Listing),
        };

        let config = settings.scan_config(Path::new("/data"), &overrides).unwrap();
        assert_eq!(config.root, PathBuf::from("/data"));
        assert_eq!(config.denylist, [PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(config.progress, ProgressMode::Exact);
        assert_eq!(config.size_workers, 1);
        assert!(config.include_hidden);
        assert!(!config.deny_user_cache);
        assert_eq!(config.sort, SortOrder::Listing);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = Settings::default()
            .scan_config(Path::new(""), &Overrides::default())
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig { .. }));
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = Settings::default()
            .scan_config(Path::new("/data"), &Overrides::default())
            .unwrap();
        assert!(config.deny_user_cache);
        assert_eq!(config.progress, ProgressMode::default());
        assert_eq!(config.size_workers, DEFAULT_SIZE_WORKERS);
    }
}
