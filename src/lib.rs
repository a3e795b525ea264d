//! # sse-repl
//!
//! Interactive console that broadcasts operator input to every client
//! connected to a Server-Sent Events stream.
//!
//! Each line typed at the console becomes a [`domain::Message`] that is
//! fanned out, in order, to every subscriber connected at that moment.
//! A slow subscriber only grows its own queue; it never delays the
//! console or any other subscriber.
//!
//! ## Architecture
//!
//! ```text
//! stdin (console thread)
//!     │
//!     ├── Parser (domain/parser)
//!     ├── Publisher ──▶ PublishCoordinator (service/)
//!     │
//!     ├── SubscriberRegistry::broadcast (domain/)
//!     │       │
//!     │       ├── DeliveryQueue ──▶ SubscriptionSession ──▶ GET /events
//!     │       └── DeliveryQueue ──▶ SubscriptionSession ──▶ GET /events
//!     │
//!     └── Static files, /health (api/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod repl;
pub mod server;
pub mod service;
pub mod sse;
