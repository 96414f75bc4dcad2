//! In-process telemetry hub.
//!
//! The socket layer publishes every [`PrinterStatus`] it receives into a
//! [`StatusFeed`]. Screens subscribe on creation and drain their
//! [`StatusSubscription`] from the UI loop. Dropping a subscription is the
//! unsubscribe: the feed prunes the dead channel on the next publish.

use crate::status::PrinterStatus;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::trace;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct FeedInner {
    latest: Option<PrinterStatus>,
    subscribers: Vec<Sender<PrinterStatus>>,
}

/// Fan-out hub for printer status snapshots.
///
/// New subscribers receive the latest snapshot immediately, so a screen
/// always has one status to read once the printer has reported at least once.
///
/// ```
/// use printdash_core::{PrinterState, PrinterStatus, StatusFeed};
///
/// let feed = StatusFeed::new();
/// let subscription = feed.subscribe();
/// feed.publish(PrinterStatus { state: PrinterState::Printing, ..Default::default() });
///
/// let received: Vec<_> = subscription.drain().collect();
/// assert_eq!(received.len(), 1);
/// assert_eq!(feed.latest().unwrap().state, PrinterState::Printing);
/// ```
#[derive(Default)]
pub struct StatusFeed {
    inner: Mutex<FeedInner>,
}

impl StatusFeed {
    /// Create an empty feed.
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, FeedInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a snapshot to every live subscriber.
    pub fn publish(&self, status: PrinterStatus) {
        let mut inner = self.inner();
        inner
            .subscribers
            .retain(|tx| tx.send(status.clone()).is_ok());
        trace!(
            "status published: state={:?}, subscribers={}",
            status.state,
            inner.subscribers.len()
        );
        inner.latest = Some(status);
    }

    /// The most recent snapshot, if any was published.
    pub fn latest(&self) -> Option<PrinterStatus> {
        self.inner().latest.clone()
    }

    /// Subscribe to future snapshots, replaying the latest one first.
    pub fn subscribe(&self) -> StatusSubscription {
        let (tx, rx) = unbounded();
        let mut inner = self.inner();
        if let Some(latest) = &inner.latest {
            // The receiver is alive, so this cannot fail.
            let _ = tx.send(latest.clone());
        }
        inner.subscribers.push(tx);
        StatusSubscription { rx }
    }

    /// Number of subscribers still attached as of the last publish.
    pub fn subscriber_count(&self) -> usize {
        self.inner().subscribers.len()
    }
}

/// A screen's handle on the status feed. Drop it to unsubscribe.
pub struct StatusSubscription {
    rx: Receiver<PrinterStatus>,
}

impl StatusSubscription {
    /// Take every snapshot received since the last drain, oldest first.
    pub fn drain(&self) -> impl Iterator<Item = PrinterStatus> + '_ {
        self.rx.try_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::PrinterState;

    fn status(state: PrinterState) -> PrinterStatus {
        PrinterStatus {
            state,
            ..Default::default()
        }
    }

    #[test]
    fn subscriber_gets_latest_on_subscribe() {
        let feed = StatusFeed::new();
        feed.publish(status(PrinterState::Idle));
        feed.publish(status(PrinterState::Paused));

        let subscription = feed.subscribe();
        let received: Vec<_> = subscription.drain().map(|s| s.state).collect();
        assert_eq!(received, vec![PrinterState::Paused]);
    }

    #[test]
    fn dropped_subscription_is_pruned_on_publish() {
        let feed = StatusFeed::new();
        let first = feed.subscribe();
        let second = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 2);

        drop(first);
        feed.publish(status(PrinterState::Printing));
        assert_eq!(feed.subscriber_count(), 1);
        assert_eq!(second.drain().count(), 1);
    }

    #[test]
    fn drain_is_empty_without_new_snapshots() {
        let feed = StatusFeed::new();
        let subscription = feed.subscribe();
        assert_eq!(subscription.drain().count(), 0);
        assert!(feed.latest().is_none());
    }
}
