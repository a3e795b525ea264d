//! Broadcast messages produced by the operator.
//!
//! A [`Message`] is either a plain data message or a named event. The
//! event name lives inside [`MessageKind::Named`], so a data message can
//! never carry a name and a named event can never lack one.

use std::fmt;

/// Discriminates plain data messages from named events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Untagged data, delivered as the default `message` event.
    Data,
    /// Application-defined event category.
    Named(String),
}

/// Immutable unit of broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    kind: MessageKind,
    payload: String,
}

impl Message {
    /// Creates a plain data message.
    #[must_use]
    pub fn data(payload: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Data,
            payload: payload.into(),
        }
    }

    /// Creates a named event message.
    #[must_use]
    pub fn named(event: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Named(event.into()),
            payload: payload.into(),
        }
    }

    /// Returns the message kind.
    #[must_use]
    pub const fn kind(&self) -> &MessageKind {
        &self.kind
    }

    /// Returns the event name for named events, `None` for data messages.
    #[must_use]
    pub fn event_name(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Data => None,
            MessageKind::Named(name) => Some(name),
        }
    }

    /// Returns the payload. May be empty.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MessageKind::Data => write!(f, "data: {}", self.payload),
            MessageKind::Named(name) => write!(f, "event: {name} {}", self.payload),
        }
    }
}
