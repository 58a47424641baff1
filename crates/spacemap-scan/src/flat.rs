//! One-level scan of a single directory with exact progress.

use std::path::Path;

use tracing::debug;

use spacemap_core::{Entry, ScanConfig, normalize_path};

use crate::denylist::Denylist;
use crate::listing::{ListFilter, list_dir};
use crate::size::SizeCalculator;

/// Size every immediate child of `dir`, reporting progress after each one.
///
/// Progress is `scanned * 100 / total` over the pre-counted number of
/// surviving children; an empty directory reports 100 once. Only the
/// denylist, hidden-entry and sort settings of `config` apply.
/// Returns an empty list if `dir` cannot be listed or is denylisted.
pub fn scan_directory(
    dir: impl AsRef<Path>,
    config: &ScanConfig,
    mut on_progress: impl FnMut(u8),
) -> Vec<Entry> {
    let dir = normalize_path(dir);
    let mut denylist = Denylist::from_config(config);
    denylist.anchor(&dir);
    if denylist.contains(&dir) {
        return Vec::new();
    }

    let filter = ListFilter {
        denylist: &denylist,
        include_hidden: config.include_hidden,
    };
    let mut warnings = Vec::new();
    let listed = match list_dir(&dir, filter, &mut warnings) {
        Ok(listed) => listed,
        Err(err) => {
            debug!(path = %dir.display(), kind = %err.kind(), %err, "flat scan: directory not listed");
            return Vec::new();
        }
    };

    let total = listed.len();
    if total == 0 {
        on_progress(100);
        return Vec::new();
    }

    let sizer = SizeCalculator::new();
    let mut entries = Vec::with_capacity(total);
    for (scanned, item) in listed.into_iter().enumerate() {
        let report = sizer.compute(&item.path);
        warnings.extend(report.warnings);
        entries.push(Entry {
            name: item.name,
            path: item.path,
            size: report.bytes,
            is_dir: item.is_dir,
        });
        on_progress(((scanned + 1) * 100 / total) as u8);
    }

    for warning in &warnings {
        debug!(path = %warning.path.display(), kind = %warning.kind, "flat scan: entry counted as 0 bytes");
    }

    config.sort.apply(&mut entries);
    entries
}
