//! Subscription session state machine.
//!
//! One [`SubscriptionSession`] exists per streaming connection:
//!
//! ```text
//! Connecting ──activate()──▶ Active ──queue closed / dropped──▶ Closed
//! ```
//!
//! Entering `Closed` unregisters the session's queue exactly once, on
//! every path: the queue ending, an explicit [`SubscriptionSession::close`],
//! or the session being dropped because the client went away or a write
//! failed.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_util::Stream;

use crate::domain::{DeliveryQueue, Message, SubscriberId, SubscriberRegistry};

/// Lifecycle state of a [`SubscriptionSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, not yet registered.
    Connecting,
    /// Registered and receiving messages.
    Active,
    /// Unregistered; yields nothing further.
    Closed,
}

/// Binds one delivery queue to one connection's lifetime.
#[derive(Debug)]
pub struct SubscriptionSession {
    registry: Arc<SubscriberRegistry>,
    queue: Option<DeliveryQueue>,
    state: SessionState,
}

impl SubscriptionSession {
    /// Creates a session in [`SessionState::Connecting`].
    #[must_use]
    pub fn new(registry: Arc<SubscriberRegistry>) -> Self {
        Self {
            registry,
            queue: None,
            state: SessionState::Connecting,
        }
    }

    /// Creates a session and activates it immediately.
    #[must_use]
    pub fn open(registry: Arc<SubscriberRegistry>) -> Self {
        let mut session = Self::new(registry);
        session.activate();
        session
    }

    /// Registers a delivery queue and moves to [`SessionState::Active`].
    ///
    /// No-op unless the session is still connecting.
    pub fn activate(&mut self) {
        if self.state != SessionState::Connecting {
            return;
        }
        let queue = self.registry.register();
        tracing::info!(subscriber = %queue.id(), "subscriber connected");
        self.queue = Some(queue);
        self.state = SessionState::Active;
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the registered handle once active.
    #[must_use]
    pub fn id(&self) -> Option<SubscriberId> {
        self.queue.as_ref().map(DeliveryQueue::id)
    }

    /// Waits for the next message. Returns `None` once closed.
    pub async fn next_message(&mut self) -> Option<Arc<Message>> {
        if self.state != SessionState::Active {
            return None;
        }
        let next = self.queue.as_mut()?.dequeue_next().await;
        if next.is_none() {
            self.close();
        }
        next
    }

    /// Moves to [`SessionState::Closed`], unregistering if needed.
    /// Idempotent.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Some(queue) = self.queue.as_mut() {
            queue.close();
            self.registry.unregister(queue.id());
            tracing::info!(
                subscriber = %queue.id(),
                dropped = queue.pending(),
                "subscriber disconnected"
            );
        }
        self.state = SessionState::Closed;
    }
}

impl Stream for SubscriptionSession {
    type Item = Arc<Message>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state != SessionState::Active {
            return Poll::Ready(None);
        }
        let Some(queue) = this.queue.as_mut() else {
            return Poll::Ready(None);
        };
        match queue.poll_dequeue(cx) {
            Poll::Ready(None) => {
                this.close();
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl Drop for SubscriptionSession {
    fn drop(&mut self) {
        self.close();
    }
}
