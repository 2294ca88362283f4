//! Subscriber registry for reload notifications.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;

/// Notification delivered to each subscriber after a successful re-render.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ReloadEvent;

/// Identifier handed out at registration.
pub(crate) type SubscriberId = u64;

/// The set of currently open reload subscribers.
///
/// Each entry is the sending half of an unbounded channel whose receiving
/// half lives in that connection's WebSocket task. A send fails only once
/// the task has dropped the receiver, which is how closed connections
/// surface here.
pub(crate) struct SubscriberRegistry {
    subscribers: Mutex<HashMap<SubscriberId, mpsc::UnboundedSender<ReloadEvent>>>,
    next_id: AtomicU64,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub(crate) fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Add a subscriber, returning its id and the event receiver for the
    /// connection task. Called once per accepted connection.
    pub(crate) fn register(&self) -> (SubscriberId, mpsc::UnboundedReceiver<ReloadEvent>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().insert(id, tx);
        (id, rx)
    }

    /// Remove a subscriber. Safe to call for an id that was already pruned.
    pub(crate) fn remove(&self, id: SubscriberId) {
        self.subscribers.lock().unwrap().remove(&id);
    }

    /// Number of currently registered subscribers.
    pub(crate) fn count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    /// Deliver one reload notification to every registered subscriber.
    ///
    /// The subscriber set is snapshotted up front, delivery is attempted
    /// outside the lock, and failed entries are pruned after the pass. A
    /// dead subscriber never aborts the fan-out, and a subscriber joining
    /// mid-pass is covered by the next one. Returns the number of
    /// successful deliveries.
    pub(crate) fn notify_all(&self) -> usize {
        let snapshot: Vec<_> = {
            let subscribers = self.subscribers.lock().unwrap();
            subscribers
                .iter()
                .map(|(id, tx)| (*id, tx.clone()))
                .collect()
        };

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (id, tx) in snapshot {
            if tx.send(ReloadEvent).is_ok() {
                delivered += 1;
            } else {
                failed.push(id);
            }
        }

        if !failed.is_empty() {
            let mut subscribers = self.subscribers.lock().unwrap();
            for id in &failed {
                subscribers.remove(id);
            }
            tracing::debug!(pruned = failed.len(), "Removed closed subscribers");
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_notify_reaches_every_subscriber_exactly_once() {
        let registry = SubscriberRegistry::new();
        let (_id_a, mut rx_a) = registry.register();
        let (_id_b, mut rx_b) = registry.register();

        assert_eq!(registry.notify_all(), 2);

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn test_failed_delivery_prunes_subscriber_and_continues() {
        let registry = SubscriberRegistry::new();
        let (_gone, rx_gone) = registry.register();
        let (_live, mut rx_live) = registry.register();
        drop(rx_gone);

        assert_eq!(registry.notify_all(), 1);

        assert!(rx_live.try_recv().is_ok());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_pruned_subscriber_not_notified_again() {
        let registry = SubscriberRegistry::new();
        let (_gone, rx_gone) = registry.register();
        drop(rx_gone);

        assert_eq!(registry.notify_all(), 0);
        assert_eq!(registry.count(), 0);
        assert_eq!(registry.notify_all(), 0);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let (id, rx) = registry.register();
        drop(rx);

        registry.remove(id);
        registry.remove(id);

        assert_eq!(registry.count(), 0);
    }

    #[test]
    fn test_registration_during_fanout_is_covered_by_next_pass() {
        let registry = Arc::new(SubscriberRegistry::new());

        let notifier = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for _ in 0..200 {
                    registry.notify_all();
                }
            })
        };

        let receivers: Vec<_> = (0..50).map(|_| registry.register()).collect();
        notifier.join().unwrap();

        assert_eq!(registry.count(), 50);
        // Once registration has settled, a fan-out reaches everyone.
        assert_eq!(registry.notify_all(), 50);
        drop(receivers);
    }
}
