//! Scan result map and completion metadata.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::entry::Entry;
use crate::error::ScanWarning;

/// Why a scan reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Completion {
    /// The work queue emptied.
    Drained,
    /// Heuristic progress hit 100% with directories still queued; those
    /// directories were left unscanned.
    ForcedAtFullProgress,
    /// The root itself is denylisted; nothing was listed.
    Denylisted,
}

/// Mapping from directory path to its immediate children.
///
/// A directory that could not be listed is absent as a key even if it
/// appears as an [`Entry`] in its parent's list. Treat a missing key as
/// "children unknown", not "empty".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root path the scan started from.
    #[serde(serialize_with = "crate::path::serialize_lossy")]
    pub root: PathBuf,

    /// Children lists keyed by directory path, in the order directories
    /// were listed.
    #[serde(serialize_with = "serialize_directories")]
    pub directories: IndexMap<PathBuf, Vec<Entry>>,

    /// Terminal state, `None` while the scan is still running or was halted.
    pub completion: Option<Completion>,

    /// Number of entries recorded so far.
    pub entries_processed: u64,

    /// Absorbed per-entry failures.
    pub warnings: Vec<ScanWarning>,

    /// Time spent stepping the scan.
    pub scan_duration: Duration,
}

impl ScanResult {
    /// Create an empty result for a root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            directories: IndexMap::new(),
            completion: None,
            entries_processed: 0,
            warnings: Vec::new(),
            scan_duration: Duration::ZERO,
        }
    }

    /// Record the children list of a successfully listed directory.
    pub fn record_children(&mut self, dir: impl Into<PathBuf>, children: Vec<Entry>) {
        self.entries_processed += children.len() as u64;
        self.directories.insert(dir.into(), children);
    }

    /// Mark the result as final.
    pub fn complete(&mut self, completion: Completion) {
        self.completion = Some(completion);
    }

    /// Children of a directory, or `None` if they are unknown.
    pub fn children(&self, dir: &Path) -> Option<&[Entry]> {
        self.directories.get(dir).map(Vec::as_slice)
    }

    /// Check if a directory's children are known.
    pub fn contains(&self, dir: &Path) -> bool {
        self.directories.contains_key(dir)
    }

    /// Number of directories that were listed.
    pub fn directory_count(&self) -> usize {
        self.directories.len()
    }

    /// Total number of recorded entries across all children lists.
    pub fn entry_count(&self) -> usize {
        self.directories.values().map(Vec::len).sum()
    }

    /// Total size under the root, 0 if the root was never listed.
    pub fn total_size(&self) -> u64 {
        self.children(&self.root)
            .map(|children| children.iter().map(|e| e.size).sum())
            .unwrap_or(0)
    }

    /// Check if the scan reached a terminal state.
    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Keys are written lossily, like every other path in the result.
fn serialize_directories<S: Serializer>(
    directories: &IndexMap<PathBuf, Vec<Entry>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        directories
            .iter()
            .map(|(dir, children)| (dir.to_string_lossy(), children)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ScanResult {
        let mut result = ScanResult::new("/data");
        result.record_children(
            "/data",
            vec![
                Entry::directory("docs", "/data/docs", 300),
                Entry::file("a.bin", "/data/a.bin", 100),
            ],
        );
        result.record_children("/data/docs", vec![Entry::file("x", "/data/docs/x", 300)]);
        result
    }

    #[test]
    fn test_children_known_and_unknown() {
        let result = sample();
        assert_eq!(result.children(Path::new("/data")).unwrap().len(), 2);
        assert!(result.children(Path::new("/data/missing")).is_none());
        assert!(result.contains(Path::new("/data/docs")));
    }

    #[test]
    fn test_counts_and_total() {
        let result = sample();
        assert_eq!(result.directory_count(), 2);
        assert_eq!(result.entry_count(), 3);
        assert_eq!(result.entries_processed, 3);
        assert_eq!(result.total_size(), 400);
    }

    #[test]
    fn test_empty_directory_is_distinct_from_unknown() {
        let mut result = ScanResult::new("/empty");
        assert!(result.children(Path::new("/empty")).is_none());

        result.record_children("/empty", Vec::new());
        assert_eq!(result.children(Path::new("/empty")), Some(&[][..]));
        assert_eq!(result.total_size(), 0);
    }

    #[test]
    fn test_completion() {
        let mut result = ScanResult::new("/x");
        assert!(!result.is_complete());
        result.complete(Completion::Drained);
        assert_eq!(result.completion, Some(Completion::Drained));
        assert_eq!(Completion::ForcedAtFullProgress.to_string(), "forced-at-full-progress");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_serialize_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let odd = Path::new("/data").join(OsStr::from_bytes(b"caf\xe9"));
        let mut result = ScanResult::new("/data");
        result.record_children("/data", vec![Entry::directory("caf\u{fffd}", &odd, 0)]);
        result.record_children(&odd, Vec::new());
        result
            .warnings
            .push(ScanWarning::broken_symlink(odd.join("link")));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["directories"]["/data"][0]["path"], "/data/caf\u{fffd}");
        assert!(json["directories"]["/data/caf\u{fffd}"].is_array());
        assert_eq!(json["warnings"][0]["path"], "/data/caf\u{fffd}/link");
    }
}
