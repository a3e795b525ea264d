//! Wire encoding of messages as Server-Sent Events.
//!
//! Data messages become the default event; named messages set the
//! `event:` field. The `data:` field is always a JSON object:
//!
//! ```text
//! event: status
//! data: {"message":"ok","timestamp":"2024-01-01T00:00:00.000Z"}
//! ```

use axum::response::sse::Event;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::Message;

/// JSON body carried in the `data:` field.
#[derive(Debug, Serialize)]
struct EventData<'a> {
    message: &'a str,
    timestamp: String,
}

/// Renders the JSON `data:` body for `message`.
#[must_use]
pub fn event_data(message: &Message, timestamp: DateTime<Utc>) -> String {
    let body = EventData {
        message: message.payload(),
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
    };
    serde_json::to_string(&body).unwrap_or_default()
}

/// Encodes `message` as an SSE [`Event`] stamped with `timestamp`.
#[must_use]
pub fn encode(message: &Message, timestamp: DateTime<Utc>) -> Event {
    // Fields are written in call order; `event:` must precede `data:`.
    let event = match message.event_name() {
        // An SSE field cannot span lines.
        Some(name) if name.contains(['\r', '\n']) => {
            tracing::warn!(event = name, "event name contains a line break; sending as data");
            Event::default()
        }
        Some(name) => Event::default().event(name),
        None => Event::default(),
    };
    event.data(event_data(message, timestamp))
}
