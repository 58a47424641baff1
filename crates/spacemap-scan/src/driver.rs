//! Background driver: steps a scan on a blocking thread.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use spacemap_core::{ScanConfig, ScanError, ScanResult};

use crate::observer::{ChannelObserver, ScanEvent};
use crate::scanner::{StepOutcome, TreeScanner};

/// Capacity of the event channel returned by [`start_scan`].
pub const EVENT_CHANNEL_SIZE: usize = 64;

/// Handle to a scan running in the background.
#[derive(Debug)]
pub struct ScanHandle {
    cancel: CancellationToken,
    task: JoinHandle<ScanResult>,
}

impl ScanHandle {
    /// Stop before the next step. A size computation already in flight
    /// is allowed to finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for the driver to stop and take its (possibly partial) result.
    pub async fn join(self) -> Result<ScanResult, ScanError> {
        self.task.await.map_err(|e| ScanError::Other {
            message: e.to_string(),
        })
    }
}

/// Start a background scan.
///
/// Returns a handle and a receiver that gets progress updates followed by
/// either [`ScanEvent::Completed`] or [`ScanEvent::Cancelled`]. Must be
/// called from within a tokio runtime.
pub fn start_scan(config: ScanConfig) -> (ScanHandle, mpsc::Receiver<ScanEvent>) {
    start_scan_with(config, CancellationToken::new())
}

/// Start a background scan that stops when `cancel` fires.
pub fn start_scan_with(
    config: ScanConfig,
    cancel: CancellationToken,
) -> (ScanHandle, mpsc::Receiver<ScanEvent>) {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
    let token = cancel.clone();

    // Run scan in blocking task (listing and sizing are synchronous)
    let task = tokio::task::spawn_blocking(move || {
        let mut scanner = TreeScanner::with_observer(config, ChannelObserver::new(tx.clone()));
        scanner.start();

        loop {
            if token.is_cancelled() {
                info!(
                    root = %scanner.root().display(),
                    listed = scanner.result().directory_count(),
                    "scan cancelled"
                );
                let result = scanner.into_result();
                let _ = tx.blocking_send(ScanEvent::Cancelled(Arc::new(result.clone())));
                return result;
            }
            if let StepOutcome::Done(_) = scanner.step() {
                return scanner.into_result();
            }
        }
    });

    (ScanHandle { cancel, task }, rx)
}
