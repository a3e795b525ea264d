//! Live subscriber set and message fan-out.
//!
//! [`SubscriberRegistry`] maps each [`SubscriberId`] to the producer half
//! of that subscriber's [`DeliveryQueue`]. [`SubscriberRegistry::broadcast`]
//! enqueues one message onto every registered queue.
//!
//! # Concurrency
//!
//! All state sits behind one `std::sync::Mutex`. Critical sections never
//! await and never block on a subscriber: enqueueing is a non-blocking
//! channel write. Holding the lock across the whole fan-out linearizes
//! broadcasts, so every subscriber sees them in the same order, and a
//! concurrent `register` lands either entirely before or entirely after
//! a given broadcast. `unregister` is synchronous so it can run from
//! `Drop`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::delivery_queue::{self, EnqueueError, QueueSender};
use super::{DeliveryQueue, Message, QueuePolicy, SubscriberId};

#[derive(Debug)]
struct RegistryState {
    queues: HashMap<SubscriberId, QueueSender>,
    open: bool,
}

/// Registry of every subscriber currently between connect and disconnect.
#[derive(Debug)]
pub struct SubscriberRegistry {
    state: Mutex<RegistryState>,
    policy: QueuePolicy,
}

impl SubscriberRegistry {
    /// Creates an empty registry with unbounded queues.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(QueuePolicy::Unbounded)
    }

    /// Creates an empty registry whose queues follow `policy`.
    #[must_use]
    pub fn with_policy(policy: QueuePolicy) -> Self {
        Self {
            state: Mutex::new(RegistryState {
                queues: HashMap::new(),
                open: true,
            }),
            policy,
        }
    }

    /// Returns the queue growth policy.
    #[must_use]
    pub const fn policy(&self) -> QueuePolicy {
        self.policy
    }

    // A panic while holding the lock cannot leave the map half-updated,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a new delivery queue and registers it.
    ///
    /// After [`SubscriberRegistry::shutdown`] the returned queue is
    /// already closed and is not registered.
    pub fn register(&self) -> DeliveryQueue {
        let id = SubscriberId::new();
        let (tx, rx) = delivery_queue::queue(id, self.policy);

        let mut state = self.lock();
        if state.open {
            state.queues.insert(id, tx);
            tracing::debug!(subscriber = %id, total = state.queues.len(), "subscriber registered");
        } else {
            tracing::debug!(subscriber = %id, "registry shut down; queue closed on arrival");
        }
        rx
    }

    /// Removes a subscriber. Returns `false` if it was not registered.
    ///
    /// Idempotent: a session may end concurrently with a broadcast that
    /// already pruned it.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let mut state = self.lock();
        let removed = state.queues.remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber = %id, total = state.queues.len(), "subscriber unregistered");
        }
        removed
    }

    /// Enqueues `message` onto every registered queue.
    ///
    /// Returns the number of queues that accepted it. Queues whose
    /// consumer is gone are pruned. Under
    /// [`QueuePolicy::DisconnectWhenFull`] a full queue's subscriber is
    /// dropped, which ends its stream once the backlog drains.
    pub fn broadcast(&self, message: Message) -> usize {
        let message = Arc::new(message);
        let mut state = self.lock();

        let mut delivered = 0usize;
        let mut stale = Vec::new();
        for (id, tx) in &state.queues {
            match tx.enqueue(Arc::clone(&message)) {
                Ok(()) => delivered += 1,
                Err(EnqueueError::Full) => {
                    tracing::warn!(subscriber = %id, "subscriber queue full; disconnecting slow subscriber");
                    stale.push(*id);
                }
                Err(EnqueueError::Closed) => stale.push(*id),
            }
        }
        for id in &stale {
            state.queues.remove(id);
        }

        tracing::debug!(
            event = message.event_name().unwrap_or("message"),
            delivered,
            pruned = stale.len(),
            "broadcast message"
        );
        delivered
    }

    /// Returns the number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().queues.len()
    }

    /// Returns `true` if no subscriber is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().queues.is_empty()
    }

    /// Returns `false` once [`SubscriberRegistry::shutdown`] has run.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Returns `true` if `id` is currently registered.
    #[must_use]
    pub fn contains(&self, id: SubscriberId) -> bool {
        self.lock().queues.contains_key(&id)
    }

    /// Closes every queue and refuses further registrations.
    ///
    /// Returns how many subscribers were closed. Idempotent.
    pub fn shutdown(&self) -> usize {
        let mut state = self.lock();
        state.open = false;
        let closed = state.queues.len();
        state.queues.clear();
        if closed > 0 {
            tracing::info!(closed, "closed all subscriber queues");
        }
        closed
    }
}

impl Default for SubscriberRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    async fn next_payload(queue: &mut DeliveryQueue) -> String {
        let Some(msg) = queue.dequeue_next().await else {
            panic!("queue closed unexpectedly");
        };
        msg.payload().to_string()
    }

    #[tokio::test]
    async fn every_subscriber_gets_every_message_in_order() {
        let registry = SubscriberRegistry::new();
        let mut queues: Vec<_> = (0..4).map(|_| registry.register()).collect();

        for i in 0..10 {
            assert_eq!(registry.broadcast(Message::data(i.to_string())), 4);
        }

        for queue in &mut queues {
            for i in 0..10 {
                assert_eq!(next_payload(queue).await, i.to_string());
            }
            assert_eq!(queue.pending(), 0);
        }
    }

    #[test]
    fn broadcast_on_empty_registry_is_noop() {
        let registry = SubscriberRegistry::new();
        assert_eq!(registry.broadcast(Message::data("nobody")), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_is_idempotent() {
        let registry = SubscriberRegistry::new();
        let keep = registry.register();
        let queue = registry.register();
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister(queue.id()));
        assert!(!registry.unregister(queue.id()));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(keep.id()));
        assert!(!registry.contains(queue.id()));
    }

    #[tokio::test]
    async fn late_subscriber_sees_only_later_messages() {
        let registry = SubscriberRegistry::new();
        let mut early = registry.register();
        registry.broadcast(Message::data("before"));

        let mut late = registry.register();
        registry.broadcast(Message::data("after"));

        assert_eq!(next_payload(&mut early).await, "before");
        assert_eq!(next_payload(&mut early).await, "after");
        assert_eq!(next_payload(&mut late).await, "after");
        assert_eq!(late.pending(), 0);
    }

    #[test]
    fn dropped_queue_is_pruned_without_error() {
        let registry = SubscriberRegistry::new();
        let alive = registry.register();
        let gone = registry.register();
        let gone_id = gone.id();
        drop(gone);

        assert_eq!(registry.broadcast(Message::data("x")), 1);
        assert!(!registry.contains(gone_id));
        assert!(registry.contains(alive.id()));
        assert!(!registry.unregister(gone_id));
    }

    #[tokio::test]
    async fn closed_queue_is_pruned_on_next_broadcast() {
        let registry = SubscriberRegistry::new();
        let mut queue = registry.register();
        queue.close();
        assert_eq!(registry.broadcast(Message::data("x")), 0);
        assert!(registry.is_empty());
        assert!(queue.dequeue_next().await.is_none());
    }

    #[tokio::test]
    async fn full_queue_disconnects_only_that_subscriber() {
        let Some(cap) = NonZeroUsize::new(2) else {
            panic!("non-zero");
        };
        let registry = SubscriberRegistry::with_policy(QueuePolicy::DisconnectWhenFull(cap));
        let mut fast = registry.register();
        let mut slow = registry.register();

        registry.broadcast(Message::data("1"));
        registry.broadcast(Message::data("2"));
        assert_eq!(next_payload(&mut fast).await, "1");
        assert_eq!(next_payload(&mut fast).await, "2");

        assert_eq!(registry.broadcast(Message::data("3")), 1);
        assert!(!registry.contains(slow.id()));
        assert!(registry.contains(fast.id()));
        assert_eq!(next_payload(&mut fast).await, "3");

        assert_eq!(next_payload(&mut slow).await, "1");
        assert_eq!(next_payload(&mut slow).await, "2");
        assert!(slow.dequeue_next().await.is_none());
    }

    #[tokio::test]
    async fn shutdown_closes_queues_and_rejects_registration() {
        let registry = SubscriberRegistry::new();
        let mut queue = registry.register();
        registry.broadcast(Message::data("last"));

        assert_eq!(registry.shutdown(), 1);
        assert_eq!(registry.shutdown(), 0);
        assert!(!registry.is_open());
        assert!(registry.is_empty());

        assert_eq!(next_payload(&mut queue).await, "last");
        assert!(queue.dequeue_next().await.is_none());

        let mut refused = registry.register();
        assert!(registry.is_empty());
        assert!(refused.dequeue_next().await.is_none());
    }

    #[tokio::test]
    async fn concurrent_register_and_broadcast() {
        let registry = Arc::new(SubscriberRegistry::new());
        let mut first = registry.register();

        let producer = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for i in 0..100 {
                    registry.broadcast(Message::data(i.to_string()));
                    tokio::task::yield_now().await;
                }
            })
        };
        let joiners: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                tokio::spawn(async move { registry.register() })
            })
            .collect();

        let mut late = Vec::new();
        for joiner in joiners {
            let Ok(queue) = joiner.await else {
                panic!("register task panicked");
            };
            late.push(queue);
        }
        let Ok(()) = producer.await else {
            panic!("producer panicked");
        };

        for i in 0..100 {
            assert_eq!(next_payload(&mut first).await, i.to_string());
        }

        // A late joiner may miss a prefix but never has gaps afterwards.
        for queue in &mut late {
            let pending = queue.pending();
            let start = 100 - pending;
            for i in start..100 {
                assert_eq!(next_payload(queue).await, i.to_string());
            }
        }
    }
}
