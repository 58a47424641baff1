//! Incremental breadth-first directory scanner.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info, trace, warn};

use spacemap_core::{
    Completion, Entry, ProgressMode, ScanConfig, ScanResult, ScanWarning, normalize_path,
};

use crate::denylist::Denylist;
use crate::listing::{ListFilter, Listed, count_tree, list_dir};
use crate::observer::ScanObserver;
use crate::progress::{ProgressTracker, ScanProgress};
use crate::size::{SizeCalculator, SizeReport};

/// Lifecycle of a [`TreeScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Created, not started.
    Idle,
    /// Directories are being listed one per step.
    Running,
    /// Terminal; no further steps do any work.
    Completed(Completion),
}

/// What a single [`TreeScanner::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// One directory was processed; more steps are needed.
    Continue,
    /// The scan is finished.
    Done(Completion),
}

/// Queue-driven, breadth-first scanner that lists one directory per step.
///
/// The scanner does no scheduling of its own: a timer, an event loop, a
/// worker thread or a plain loop calls [`step`](Self::step) until it
/// returns [`StepOutcome::Done`]. Stopping the caller stops the scan; the
/// partial result stays queryable.
///
/// Directory sizes are computed when the parent is listed, optionally on a
/// bounded worker pool so a single step does not serialize large subtrees.
pub struct TreeScanner<O = ()> {
    config: ScanConfig,
    root: PathBuf,
    denylist: Denylist,
    sizer: SizeCalculator,
    pool: Option<Arc<ThreadPool>>,
    state: ScanState,
    queue: VecDeque<PathBuf>,
    result: ScanResult,
    tracker: ProgressTracker,
    observer: O,
}

impl TreeScanner<()> {
    /// Create a scanner without an observer.
    pub fn new(config: ScanConfig) -> Self {
        Self::with_observer(config, ())
    }
}

impl<O: ScanObserver> TreeScanner<O> {
    /// Create a scanner that reports to `observer`.
    ///
    /// A private worker pool of `config.size_workers` threads is created
    /// when more than one worker is requested.
    pub fn with_observer(config: ScanConfig, observer: O) -> Self {
        let pool = build_pool(config.size_workers);
        Self::with_pool(config, observer, pool)
    }

    /// Create a scanner that offloads size computations to a shared pool.
    ///
    /// `None` computes sizes inline on the stepping thread.
    pub fn with_pool(config: ScanConfig, observer: O, pool: Option<Arc<ThreadPool>>) -> Self {
        let root = normalize_path(&config.root);
        let denylist = Denylist::from_config(&config);
        let result = ScanResult::new(&root);
        let tracker = ProgressTracker::new(config.progress);
        Self {
            config,
            root,
            denylist,
            sizer: SizeCalculator::new(),
            pool,
            state: ScanState::Idle,
            queue: VecDeque::new(),
            result,
            tracker,
            observer,
        }
    }

    /// Reset and begin a scan of the configured root.
    ///
    /// Calling this again restarts from scratch with progress back at 0.
    /// A denylisted root completes immediately with an empty result.
    pub fn start(&mut self) {
        self.queue.clear();
        self.result = ScanResult::new(&self.root);
        self.tracker = ProgressTracker::new(self.config.progress);
        self.state = ScanState::Running;

        info!(root = %self.root.display(), denylisted = self.denylist.len(), "scan started");

        if self.denylist.contains(&self.root) {
            self.finish(Completion::Denylisted);
            return;
        }

        if self.config.progress == ProgressMode::Exact {
            let total = count_tree(&self.root, self.filter());
            debug!(total, "pre-counted entries");
            self.tracker.set_total(total);
        }

        self.queue.push_back(self.root.clone());
        let progress = self.tracker.snapshot(self.queue.len());
        self.observer.on_progress(&progress);
    }

    /// Process the next queued directory.
    ///
    /// Starts the scan first if it is still idle. Once the queue is empty
    /// the next call completes the scan; after that every call just
    /// returns the same [`StepOutcome::Done`].
    pub fn step(&mut self) -> StepOutcome {
        match self.state {
            ScanState::Idle => self.start(),
            ScanState::Completed(completion) => return StepOutcome::Done(completion),
            ScanState::Running => {}
        }
        if let ScanState::Completed(completion) = self.state {
            return StepOutcome::Done(completion);
        }

        let Some(dir) = self.queue.pop_front() else {
            return self.finish(Completion::Drained);
        };

        self.process_directory(&dir);

        let progress = self.tracker.snapshot(self.queue.len());
        self.observer.on_progress(&progress);

        if self.tracker.forces_completion() && !self.queue.is_empty() {
            warn!(
                unscanned = self.queue.len(),
                "progress reached 100% with directories still queued"
            );
            return self.finish(Completion::ForcedAtFullProgress);
        }

        StepOutcome::Continue
    }

    /// Step until the scan completes.
    pub fn run(&mut self) -> Completion {
        loop {
            if let StepOutcome::Done(completion) = self.step() {
                return completion;
            }
        }
    }

    /// Children of `dir` in the current (possibly partial) result, or
    /// `None` if they are not known.
    pub fn children(&self, dir: &Path) -> Option<&[Entry]> {
        self.result.children(dir)
    }

    /// Current state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Current progress.
    pub fn progress(&self) -> ScanProgress {
        self.tracker.snapshot(self.queue.len())
    }

    /// Normalized root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directories waiting to be listed.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Result accumulated so far.
    pub fn result(&self) -> &ScanResult {
        &self.result
    }

    /// Hand over the result, complete or not.
    pub fn into_result(self) -> ScanResult {
        let mut result = self.result;
        if !result.is_complete() {
            result.scan_duration = self.tracker.elapsed();
        }
        result
    }

    fn filter(&self) -> ListFilter<'_> {
        ListFilter {
            denylist: &self.denylist,
            include_hidden: self.config.include_hidden,
        }
    }

    fn process_directory(&mut self, dir: &Path) {
        self.tracker.record_dir(dir);
        trace!(path = %dir.display(), "listing directory");

        let mut warnings = Vec::new();
        let listed = match list_dir(dir, self.filter(), &mut warnings) {
            Ok(listed) => listed,
            Err(err) => {
                // Leave the key absent: "could not be read" is not "empty".
                let warning = ScanWarning::read_error(dir, &err);
                debug!(path = %dir.display(), kind = %warning.kind, "directory not listed");
                self.result.warnings.push(warning);
                self.tracker.set_errors(self.result.warnings.len() as u64);
                return;
            }
        };

        let reports = self.measure(&listed);

        let mut children = Vec::with_capacity(listed.len());
        for (item, report) in listed.into_iter().zip(reports) {
            warnings.extend(report.warnings);
            children.push(Entry {
                name: item.name,
                path: item.path,
                size: report.bytes,
                is_dir: item.is_dir,
            });
        }
        self.config.sort.apply(&mut children);

        for child in &children {
            if child.is_dir {
                self.queue.push_back(child.path.clone());
            }
            self.tracker.record_entry();
        }

        self.result.warnings.extend(warnings);
        self.tracker.set_errors(self.result.warnings.len() as u64);
        self.result.record_children(dir, children);
    }

    fn measure(&self, listed: &[Listed]) -> Vec<SizeReport> {
        let sizer = &self.sizer;
        match self.pool.as_deref() {
            Some(pool) if listed.len() > 1 => pool.install(|| {
                listed
                    .par_iter()
                    .map(|item| sizer.compute(&item.path))
                    .collect()
            }),
            _ => listed.iter().map(|item| sizer.compute(&item.path)).collect(),
        }
    }

    fn finish(&mut self, completion: Completion) -> StepOutcome {
        self.state = ScanState::Completed(completion);
        self.tracker.finish();
        self.result.complete(completion);
        self.result.scan_duration = self.tracker.elapsed();

        info!(
            root = %self.root.display(),
            %completion,
            directories = self.result.directory_count(),
            entries = self.result.entries_processed,
            warnings = self.result.warnings.len(),
            "scan finished"
        );

        let progress = self.tracker.snapshot(self.queue.len());
        self.observer.on_progress(&progress);
        self.observer.on_complete(&self.result);
        StepOutcome::Done(completion)
    }
}

/// Build a bounded pool for size computations, or `None` to run inline.
pub fn build_pool(workers: usize) -> Option<Arc<ThreadPool>> {
    if workers <= 1 {
        return None;
    }
    match ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("spacemap-size-{i}"))
        .build()
    {
        Ok(pool) => Some(Arc::new(pool)),
        Err(err) => {
            warn!(%err, "could not build size worker pool, sizing inline");
            None
        }
    }
}
