//! Scan progress reporting.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use spacemap_core::ProgressMode;

/// Progress information during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanProgress {
    /// Percentage in `0..=100`, non-decreasing within one scan.
    pub percent: u8,
    /// Number of entries recorded so far.
    pub entries_processed: u64,
    /// Number of directories popped from the queue.
    pub dirs_listed: u64,
    /// Directories still waiting in the queue.
    pub queued: usize,
    /// Directory most recently listed.
    pub current_path: PathBuf,
    /// Number of errors/warnings encountered.
    pub errors_count: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            percent: 0,
            entries_processed: 0,
            dirs_listed: 0,
            queued: 0,
            current_path: PathBuf::new(),
            errors_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in entries per second.
    pub fn entries_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.entries_processed as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal progress tracker with timing.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    mode: ProgressMode,
    /// Pre-counted entry total, exact mode only.
    total: Option<u64>,
    start_time: Instant,
    entries_processed: u64,
    dirs_listed: u64,
    errors_count: u64,
    current_path: PathBuf,
    percent: u8,
}

impl ProgressTracker {
    pub fn new(mode: ProgressMode) -> Self {
        Self {
            mode,
            total: None,
            start_time: Instant::now(),
            entries_processed: 0,
            dirs_listed: 0,
            errors_count: 0,
            current_path: PathBuf::new(),
            percent: 0,
        }
    }

    pub fn set_total(&mut self, total: u64) {
        self.total = Some(total);
    }

    pub fn record_dir(&mut self, path: &Path) {
        self.dirs_listed += 1;
        self.current_path = path.to_path_buf();
    }

    pub fn record_entry(&mut self) {
        self.entries_processed += 1;
        self.percent = self.percent.max(self.computed_percent());
    }

    pub fn set_errors(&mut self, count: u64) {
        self.errors_count = count;
    }

    /// Jump to 100 at completion.
    pub fn finish(&mut self) {
        self.percent = 100;
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Whether progress alone ends the scan (heuristic mode at 100%).
    pub fn forces_completion(&self) -> bool {
        matches!(self.mode, ProgressMode::Heuristic { .. }) && self.percent() >= 100
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self, queued: usize) -> ScanProgress {
        ScanProgress {
            percent: self.percent,
            entries_processed: self.entries_processed,
            dirs_listed: self.dirs_listed,
            queued,
            current_path: self.current_path.clone(),
            errors_count: self.errors_count,
            elapsed: self.elapsed(),
        }
    }

    fn computed_percent(&self) -> u8 {
        let raw = match (self.mode, self.total) {
            (ProgressMode::Heuristic { entries_per_percent }, _) => {
                self.entries_processed / entries_per_percent.max(1)
            }
            (ProgressMode::Exact, Some(0)) => 100,
            (ProgressMode::Exact, Some(total)) => self.entries_processed * 100 / total,
            (ProgressMode::Exact, None) => 0,
        };
        raw.min(100) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_percent() {
        let mut tracker = ProgressTracker::new(ProgressMode::Heuristic {
            entries_per_percent: 10,
        });
        for _ in 0..25 {
            tracker.record_entry();
        }
        assert_eq!(tracker.percent(), 2);
        assert!(!tracker.forces_completion());

        for _ in 0..2000 {
            tracker.record_entry();
        }
        assert_eq!(tracker.percent(), 100);
        assert!(tracker.forces_completion());
    }

    #[test]
    fn test_exact_percent_never_forces() {
        let mut tracker = ProgressTracker::new(ProgressMode::Exact);
        tracker.set_total(4);
        tracker.record_entry();
        assert_eq!(tracker.percent(), 25);
        for _ in 0..3 {
            tracker.record_entry();
        }
        assert_eq!(tracker.percent(), 100);
        assert!(!tracker.forces_completion());
    }

    #[test]
    fn test_exact_percent_is_monotonic_when_total_undercounts() {
        let mut tracker = ProgressTracker::new(ProgressMode::Exact);
        tracker.set_total(2);
        for _ in 0..5 {
            tracker.record_entry();
        }
        assert_eq!(tracker.percent(), 100);
    }

    #[test]
    fn test_snapshot() {
        let mut tracker = ProgressTracker::new(ProgressMode::default());
        tracker.record_dir(Path::new("/data"));
        tracker.record_entry();
        tracker.set_errors(3);

        let progress = tracker.snapshot(7);
        assert_eq!(progress.entries_processed, 1);
        assert_eq!(progress.dirs_listed, 1);
        assert_eq!(progress.queued, 7);
        assert_eq!(progress.errors_count, 3);
        assert_eq!(progress.current_path, PathBuf::from("/data"));
    }

    #[test]
    fn test_finish() {
        let mut tracker = ProgressTracker::new(ProgressMode::default());
        tracker.finish();
        assert_eq!(tracker.percent(), 100);
    }
}
