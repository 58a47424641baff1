//! Best-effort recursive size computation.

use std::fs;
use std::io;
use std::path::Path;

use jwalk::{Parallelism, WalkDir};
use tracing::debug;

use spacemap_core::{ScanWarning, WarningKind};

/// Bytes measured for a path plus the failures that were absorbed on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeReport {
    /// Sum of every reachable regular file.
    pub bytes: u64,
    /// Entries that contributed 0 bytes because they could not be read.
    pub warnings: Vec<ScanWarning>,
}

impl SizeReport {
    fn skip(&mut self, warning: ScanWarning) {
        debug!(path = %warning.path.display(), kind = %warning.kind, "size: skipping entry");
        self.warnings.push(warning);
    }
}

/// Computes the total byte size of a file or directory subtree.
///
/// Never fails: anything unreadable contributes 0 bytes and the walk moves
/// on to its siblings. Directory symlinks are never descended into, which
/// is the only cycle protection needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeCalculator;

impl SizeCalculator {
    /// Create a new calculator.
    pub fn new() -> Self {
        Self
    }

    /// Measure `path`.
    ///
    /// Regular files report their own size. Symlinks to files report the
    /// target's size; symlinks to directories report 0. Directories report
    /// the sum over their whole subtree.
    pub fn compute(&self, path: &Path) -> SizeReport {
        let mut report = SizeReport::default();

        let metadata = match fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(err) => {
                report.skip(ScanWarning::metadata_error(path, &err));
                return report;
            }
        };

        if metadata.is_dir() {
            self.walk(path, &mut report);
        } else if metadata.file_type().is_symlink() {
            report.bytes = symlink_size(path, &mut report);
        } else if metadata.is_file() {
            report.bytes = metadata.len();
        }

        report
    }

    /// Sum every non-directory entry below `root`.
    ///
    /// The walk is serial: callers that want concurrency run several
    /// calculators on disjoint subtrees instead.
    fn walk(&self, root: &Path, report: &mut SizeReport) {
        let walker = WalkDir::new(root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false);

        for entry_result in walker {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf());
                    let warning = match err.io_error() {
                        Some(io_err) => ScanWarning::read_error(path, io_err),
                        None => ScanWarning::new(path, err.to_string(), WarningKind::ReadError),
                    };
                    report.skip(warning);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if let Some(err) = &entry.read_children_error {
                    let path = entry.path();
                    let warning = match err.io_error() {
                        Some(io_err) => ScanWarning::read_error(path, io_err),
                        None => ScanWarning::new(path, err.to_string(), WarningKind::ReadError),
                    };
                    report.skip(warning);
                }
                continue;
            }

            let path = entry.path();
            if file_type.is_symlink() {
                let bytes = symlink_size(&path, report);
                report.bytes += bytes;
            } else if file_type.is_file() {
                match entry.metadata() {
                    Ok(m) => report.bytes += m.len(),
                    Err(err) => {
                        let warning = match err.io_error() {
                            Some(io_err) => ScanWarning::metadata_error(&path, io_err),
                            None => ScanWarning::new(&path, err.to_string(), WarningKind::MetadataError),
                        };
                        report.skip(warning);
                    }
                }
            }
        }
    }
}

/// Size of whatever a symlink points at, if that is a regular file.
fn symlink_size(path: &Path, report: &mut SizeReport) -> u64 {
    match fs::metadata(path) {
        Ok(target) if target.is_file() => target.len(),
        Ok(_) => 0,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            report.skip(ScanWarning::broken_symlink(path));
            0
        }
        Err(err) => {
            report.skip(ScanWarning::metadata_error(path, &err));
            0
        }
    }
}

/// Total size of `path` in bytes, 0 if it cannot be read at all.
pub fn compute_size(path: impl AsRef<Path>) -> u64 {
    SizeCalculator::new().compute(path.as_ref()).bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir1/.hidden"), "secret").unwrap();

        temp
    }

    #[test]
    fn test_file_size() {
        let temp = create_test_tree();
        assert_eq!(compute_size(temp.path().join("file1.txt")), 5);
    }

    #[test]
    fn test_directory_sums_subtree_including_hidden() {
        let temp = create_test_tree();
        assert_eq!(compute_size(temp.path().join("dir1")), 17 + 4 + 6);
        assert_eq!(compute_size(temp.path()), 5 + 17 + 4 + 6);
    }

    #[test]
    fn test_empty_directory() {
        let temp = create_test_tree();
        assert_eq!(compute_size(temp.path().join("empty")), 0);
    }

    #[test]
    fn test_missing_path_is_zero_with_warning() {
        let temp = TempDir::new().unwrap();
        let report = SizeCalculator::new().compute(&temp.path().join("nope"));
        assert_eq!(report.bytes, 0);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].kind, WarningKind::NotFound);
    }

    #[test]
    fn test_idempotent() {
        let temp = create_test_tree();
        let calc = SizeCalculator::new();
        assert_eq!(calc.compute(temp.path()), calc.compute(temp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_directory_symlink_not_followed() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("dir1/loop")).unwrap();

        // A cycle back to the root adds nothing and terminates.
        assert_eq!(compute_size(temp.path().join("dir1")), 27);
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_contributes_zero() {
        let temp = create_test_tree();
        std::os::unix::fs::symlink("/definitely/not/here", temp.path().join("empty/dangling")).unwrap();

        let report = SizeCalculator::new().compute(&temp.path().join("empty"));
        assert_eq!(report.bytes, 0);
        assert_eq!(report.warnings[0].kind, WarningKind::BrokenSymlink);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_symlink_counts_target() {
        let temp = create_test_tree();
        let link = temp.path().join("empty/link.txt");
        std::os::unix::fs::symlink(temp.path().join("file1.txt"), &link).unwrap();
        assert_eq!(compute_size(&link), 5);
    }
}
