//! Live query subscriptions.
//!
//! Reads come in two distinct flavors that are never conflated:
//!
//! - **One-shot** (`get_*` on the stores): resolves exactly once from the
//!   current committed state.
//! - **Live** (`watch_*` on the stores): returns a [`Subscription`] that
//!   delivers an initial snapshot immediately and then re-delivers a fresh
//!   result after every committed write to the collection.
//!
//! Cancellation is dropping the [`Subscription`]; the store prunes
//! disconnected subscribers on the next notification. Cancelling a
//! subscription never affects stored data.

use crate::error::StoreResult;
use parking_lot::RwLock;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Distributes change notifications to live query subscribers.
///
/// Notifications carry no payload; each subscription re-runs its own query
/// against the committed state when woken. Bursts of writes may coalesce
/// into a single delivery.
#[derive(Default)]
pub(crate) struct Notifier {
    subscribers: RwLock<Vec<Sender<()>>>,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    pub(crate) fn subscribe(&self) -> Receiver<()> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.write().push(tx);
        rx
    }

    /// Wakes all subscribers, dropping the disconnected ones.
    pub(crate) fn notify(&self) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|tx| tx.send(()).is_ok());
    }

    /// Returns the number of live subscribers.
    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

/// A long-lived handle to a live query.
///
/// The first [`Subscription::recv`] returns the current result immediately;
/// subsequent calls block until the underlying collection changes, then
/// re-run the query. Dropping the subscription cancels it.
pub struct Subscription<T> {
    wakeups: Receiver<()>,
    query: Box<dyn Fn() -> StoreResult<T> + Send>,
    delivered_initial: bool,
}

impl<T> Subscription<T> {
    pub(crate) fn new(wakeups: Receiver<()>, query: Box<dyn Fn() -> StoreResult<T> + Send>) -> Self {
        Self {
            wakeups,
            query,
            delivered_initial: false,
        }
    }

    /// Receives the next query result.
    ///
    /// Blocks until the collection changes (except for the initial
    /// delivery). Returns `None` once the store has been dropped.
    pub fn recv(&mut self) -> Option<StoreResult<T>> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some((self.query)());
        }

        self.wakeups.recv().ok()?;
        self.drain_pending();
        Some((self.query)())
    }

    /// Receives the next query result, giving up after `timeout`.
    ///
    /// Returns `None` on timeout or when the store has been dropped.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<StoreResult<T>> {
        if !self.delivered_initial {
            self.delivered_initial = true;
            return Some((self.query)());
        }

        match self.wakeups.recv_timeout(timeout) {
            Ok(()) => {
                self.drain_pending();
                Some((self.query)())
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Coalesces queued wakeups so a burst of writes yields one delivery.
    fn drain_pending(&self) {
        while self.wakeups.try_recv().is_ok() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn constant_subscription(notifier: &Notifier, value: i32) -> Subscription<i32> {
        let rx = notifier.subscribe();
        Subscription::new(rx, Box::new(move || Ok(value)))
    }

    #[test]
    fn initial_delivery_is_immediate() {
        let notifier = Notifier::new();
        let mut sub = constant_subscription(&notifier, 7);

        assert_eq!(sub.recv().unwrap().unwrap(), 7);
    }

    #[test]
    fn notify_wakes_subscriber() {
        let notifier = Notifier::new();
        let mut sub = constant_subscription(&notifier, 7);
        sub.recv();

        notifier.notify();
        assert_eq!(sub.recv_timeout(Duration::from_millis(100)).unwrap().unwrap(), 7);
    }

    #[test]
    fn no_change_means_no_delivery() {
        let notifier = Notifier::new();
        let mut sub = constant_subscription(&notifier, 7);
        sub.recv();

        assert!(sub.recv_timeout(Duration::from_millis(20)).is_none());
    }

    #[test]
    fn dropped_subscription_is_pruned() {
        let notifier = Notifier::new();
        let sub = constant_subscription(&notifier, 7);
        assert_eq!(notifier.subscriber_count(), 1);

        drop(sub);
        notifier.notify();
        assert_eq!(notifier.subscriber_count(), 0);
    }

    #[test]
    fn burst_of_notifications_coalesces() {
        let notifier = Notifier::new();
        let count = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let rx = notifier.subscribe();
        let mut sub: Subscription<usize> = Subscription::new(
            rx,
            Box::new(move || {
                Ok(count_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst))
            }),
        );

        sub.recv();
        for _ in 0..5 {
            notifier.notify();
        }

        // One wakeup for the whole burst.
        assert!(sub.recv_timeout(Duration::from_millis(100)).is_some());
        assert!(sub.recv_timeout(Duration::from_millis(20)).is_none());
    }

    #[test]
    fn recv_returns_none_when_notifier_dropped() {
        let notifier = Notifier::new();
        let mut sub = constant_subscription(&notifier, 7);
        sub.recv();

        drop(notifier);
        assert!(sub.recv().is_none());
    }
}
