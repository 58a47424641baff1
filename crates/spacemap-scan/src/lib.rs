//! Incremental directory scanning engine for spacemap.
//!
//! This crate walks a directory tree breadth-first, one directory per
//! step, recording each directory's immediate children with their
//! recursive sizes.
//!
//! # Overview
//!
//! - **Step-driven** via [`TreeScanner::step`]; any scheduler can drive it
//! - **Best effort**: unreadable entries are sized as 0 and reported as
//!   warnings, never as errors
//! - **Lazy consumption**: query [`ScanResult::children`] for the path on
//!   screen, even while the scan is still running
//! - **Bounded sizing pool** for recursive directory sizes
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use spacemap_scan::{ScanConfig, TreeScanner};
//!
//! let mut scanner = TreeScanner::new(ScanConfig::new("/path/to/scan"));
//! scanner.run();
//!
//! let result = scanner.into_result();
//! if let Some(children) = result.children(&result.root) {
//!     for entry in children {
//!         println!("{} {}", entry.name, entry.size);
//!     }
//! }
//! ```
//!
//! # Background Scanning
//!
//! ```rust,no_run
//! use spacemap_scan::{ScanConfig, ScanEvent, start_scan};
//!
//! # async fn demo() {
//! let (handle, mut events) = start_scan(ScanConfig::new("/path/to/scan"));
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ScanEvent::Progress(p) => println!("{}%", p.percent),
//!         ScanEvent::Completed(_) | ScanEvent::Cancelled(_) => break,
//!     }
//! }
//! let result = handle.join().await.unwrap();
//! # }
//! ```

mod denylist;
mod driver;
mod flat;
mod listing;
mod observer;
mod progress;
mod scanner;
mod size;

pub use denylist::{Denylist, user_cache_dirs};
pub use driver::{EVENT_CHANNEL_SIZE, ScanHandle, start_scan, start_scan_with};
pub use flat::scan_directory;
pub use observer::{ChannelObserver, ScanEvent, ScanObserver};
pub use progress::ScanProgress;
pub use scanner::{ScanState, StepOutcome, TreeScanner, build_pool};
pub use size::{SizeCalculator, SizeReport, compute_size};

// Re-export core types for convenience
pub use spacemap_core::{
    Completion, DEFAULT_SIZE_WORKERS, Entry, ProgressMode, ScanConfig, ScanError, ScanResult,
    ScanWarning, SortOrder, WarningKind, format_size, normalize_path, resolve_path, resolve_root,
};
pub use tokio_util::sync::CancellationToken;
