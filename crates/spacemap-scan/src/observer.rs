//! Progress and completion notifications.

use std::sync::Arc;

use tokio::sync::mpsc;

use spacemap_core::ScanResult;

use crate::progress::ScanProgress;

/// Receives notifications from a [`TreeScanner`](crate::TreeScanner).
///
/// Progress arrives after every step; `on_complete` arrives exactly once,
/// right after a final 100% progress notification.
pub trait ScanObserver {
    /// Called after each processed directory.
    fn on_progress(&mut self, _progress: &ScanProgress) {}

    /// Called once when the scan reaches a terminal state.
    fn on_complete(&mut self, _result: &ScanResult) {}
}

/// Ignores all notifications.
impl ScanObserver for () {}

impl<O: ScanObserver + ?Sized> ScanObserver for &mut O {
    fn on_progress(&mut self, progress: &ScanProgress) {
        (**self).on_progress(progress);
    }

    fn on_complete(&mut self, result: &ScanResult) {
        (**self).on_complete(result);
    }
}

/// Event forwarded by [`ChannelObserver`] and the background driver.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Periodic progress update.
    Progress(ScanProgress),
    /// The scan reached a terminal state.
    Completed(Arc<ScanResult>),
    /// The driver was stopped; carries what had been collected.
    Cancelled(Arc<ScanResult>),
}

/// Forwards notifications over a tokio channel.
///
/// Progress updates are dropped when the channel is full; the completion
/// event waits for room. Must not be driven from inside an async task.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<ScanEvent>,
}

impl ChannelObserver {
    /// Wrap a sender.
    pub fn new(tx: mpsc::Sender<ScanEvent>) -> Self {
        Self { tx }
    }
}

impl ScanObserver for ChannelObserver {
    fn on_progress(&mut self, progress: &ScanProgress) {
        let _ = self.tx.try_send(ScanEvent::Progress(progress.clone()));
    }

    fn on_complete(&mut self, result: &ScanResult) {
        let _ = self
            .tx
            .blocking_send(ScanEvent::Completed(Arc::new(result.clone())));
    }
}
