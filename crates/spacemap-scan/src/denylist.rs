//! Paths the scanner refuses to enter or report.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use spacemap_core::{ScanConfig, normalize_path};

/// Set of absolute paths skipped during a scan.
///
/// Every path is stored normalized and, when it exists, also in its
/// symlink-resolved form. Matching is exact: a denylisted directory is
/// skipped when it is met as an entry, so nothing below it is ever listed.
#[derive(Debug, Clone, Default)]
pub struct Denylist {
    paths: HashSet<PathBuf>,
}

impl Denylist {
    /// Create a denylist from arbitrary paths, normalizing each one.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut denylist = Self::default();
        for path in paths {
            denylist.insert(path);
        }
        denylist
    }

    /// Build the denylist for a scan: the configured paths plus, unless
    /// disabled, the current user's cache directories, anchored at the
    /// configured root.
    pub fn from_config(config: &ScanConfig) -> Self {
        let mut denylist = Self::new(&config.denylist);
        if config.deny_user_cache {
            for dir in user_cache_dirs() {
                denylist.insert(dir);
            }
        }
        denylist.anchor(&normalize_path(&config.root));
        denylist
    }

    /// Add a path. Returns `false` if it was already present.
    pub fn insert(&mut self, path: impl AsRef<Path>) -> bool {
        let normalized = normalize_path(path);
        let resolved = fs::canonicalize(&normalized).ok();
        let added = self.paths.insert(normalized);
        match resolved {
            Some(resolved) => self.paths.insert(resolved) || added,
            None => added,
        }
    }

    /// Make entries reachable under `root` match when `root` is spelled
    /// through a symlink.
    ///
    /// Scan paths are built by joining names onto the root and never pass
    /// through a followed symlink below it, so resolving the root once is
    /// enough: every denylisted path under the resolved root is added again
    /// under `root` as given.
    pub fn anchor(&mut self, root: &Path) {
        let Ok(resolved) = fs::canonicalize(root) else {
            return;
        };
        if resolved == root {
            return;
        }
        let rebased: Vec<PathBuf> = self
            .paths
            .iter()
            .filter_map(|path| path.strip_prefix(&resolved).ok())
            .map(|rest| root.join(rest))
            .collect();
        self.paths.extend(rebased);
    }

    /// Check if a normalized path is denylisted.
    ///
    /// No filesystem access: call [`anchor`](Self::anchor) with the scan
    /// root first so paths below a symlinked root match.
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    /// Number of stored paths, counting resolved forms separately.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if nothing is denylisted.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Iterate over the denylisted paths.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }
}

/// The current user's cache / app-data directories, resolved at runtime.
///
/// On Windows `cache_dir` is the local app-data directory; the roaming one
/// is added as well.
pub fn user_cache_dirs() -> Vec<PathBuf> {
    let mut found = Vec::new();
    found.extend(dirs::cache_dir());
    #[cfg(windows)]
    {
        found.extend(dirs::data_local_dir());
        found.extend(dirs::data_dir());
    }
    found.dedup();
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_paths_are_normalized() {
        let denylist = Denylist::new(["/srv/./data/../cache"]);
        assert!(denylist.contains(Path::new("/srv/cache")));
        assert!(!denylist.contains(Path::new("/srv/cache/child")));
    }

    #[test]
    fn test_from_config_adds_user_cache() {
        let config = ScanConfig::new("/");
        let denylist = Denylist::from_config(&config);
        for dir in user_cache_dirs() {
            assert!(denylist.contains(&normalize_path(dir)));
        }

        let mut config = ScanConfig::new("/");
        config.deny_user_cache = false;
        assert!(Denylist::from_config(&config).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_insert_dedupes() {
        let mut denylist = Denylist::default();
        assert!(denylist.insert("/no/such/a/b"));
        assert!(!denylist.insert("/no/such/a/./b"));
        assert_eq!(denylist.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_path_through_symlink_matches_resolved() {
        let temp = tempfile::TempDir::new().unwrap();
        let real = temp.path().join("real");
        std::fs::create_dir_all(real.join("big")).unwrap();
        std::os::unix::fs::symlink(&real, temp.path().join("link")).unwrap();

        let denylist = Denylist::new([temp.path().join("link/big")]);
        let resolved = real.join("big").canonicalize().unwrap();
        assert!(denylist.contains(&resolved));
    }

    #[cfg(unix)]
    #[test]
    fn test_anchor_rebases_onto_symlinked_root() {
        let temp = tempfile::TempDir::new().unwrap();
        let real = temp.path().join("real");
        std::fs::create_dir_all(real.join("big")).unwrap();
        let link = normalize_path(temp.path().join("link"));
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let mut denylist = Denylist::new([real.join("big")]);
        assert!(!denylist.contains(&link.join("big")));

        denylist.anchor(&link);
        assert!(denylist.contains(&link.join("big")));
    }
}
