//! Single-directory listing shared by the tree scan, the flat scan and the
//! exact-progress pre-count.

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use compact_str::CompactString;
use tracing::debug;

use spacemap_core::ScanWarning;

use crate::denylist::Denylist;

/// An entry that survived filtering, before it is sized.
#[derive(Debug, Clone)]
pub(crate) struct Listed {
    pub name: CompactString,
    pub path: PathBuf,
    /// From the directory entry itself; symlinks are never directories.
    pub is_dir: bool,
}

/// Filtering rules applied to every listing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListFilter<'a> {
    pub denylist: &'a Denylist,
    pub include_hidden: bool,
}

impl ListFilter<'_> {
    fn skips(&self, name: &str, path: &Path) -> bool {
        (!self.include_hidden && spacemap_core::is_hidden_name(name)) || self.denylist.contains(path)
    }
}

/// List the immediate children of `dir`.
///
/// Fails only when `dir` itself cannot be opened. Entries that vanish or
/// cannot be typed mid-listing are skipped and recorded in `warnings`.
pub(crate) fn list_dir(
    dir: &Path,
    filter: ListFilter<'_>,
    warnings: &mut Vec<ScanWarning>,
) -> io::Result<Vec<Listed>> {
    let mut listed = Vec::new();

    for entry_result in fs::read_dir(dir)? {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                let warning = ScanWarning::read_error(dir, &err);
                debug!(path = %dir.display(), kind = %warning.kind, "listing: skipping entry");
                warnings.push(warning);
                continue;
            }
        };

        let name = CompactString::new(entry.file_name().to_string_lossy());
        let path = entry.path();
        if filter.skips(&name, &path) {
            continue;
        }

        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(err) => {
                let warning = ScanWarning::metadata_error(&path, &err);
                debug!(path = %path.display(), kind = %warning.kind, "listing: skipping entry");
                warnings.push(warning);
                continue;
            }
        };

        listed.push(Listed {
            name,
            path,
            is_dir: file_type.is_dir(),
        });
    }

    Ok(listed)
}

/// Count every entry a full scan from `root` would record.
///
/// Used as the denominator for exact progress. Unlistable directories
/// count as empty; warnings from this pass are discarded since the scan
/// proper reports them.
pub(crate) fn count_tree(root: &Path, filter: ListFilter<'_>) -> u64 {
    let mut total = 0;
    let mut queue = VecDeque::from([root.to_path_buf()]);
    let mut ignored = Vec::new();

    while let Some(dir) = queue.pop_front() {
        let Ok(children) = list_dir(&dir, filter, &mut ignored) else {
            continue;
        };
        total += children.len() as u64;
        queue.extend(children.into_iter().filter(|c| c.is_dir).map(|c| c.path));
        ignored.clear();
    }

    total
}
