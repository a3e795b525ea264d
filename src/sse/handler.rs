//! Axum handler for the `/events` stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::sse::{Event, KeepAlive, Sse};
use chrono::Utc;
use futures_util::{StreamExt, stream};

use super::encode::encode;
use super::session::SubscriptionSession;
use crate::app_state::AppState;

/// Comment sent as the first frame so clients see the stream open.
const CONNECTED_COMMENT: &str = "connected";

/// `GET /events` — Subscribe to operator broadcasts.
///
/// The stream ends when the server shuts down. When the client
/// disconnects, axum drops the stream and the session unregisters.
pub async fn events_handler(State(state): State<AppState>) -> impl IntoResponse {
    let session = SubscriptionSession::open(Arc::clone(&state.registry));

    let greeting = stream::once(async {
        Ok::<_, Infallible>(Event::default().comment(CONNECTED_COMMENT))
    });
    let events = session.map(|message| Ok(encode(&message, Utc::now())));

    let sse = Sse::new(greeting.chain(events));
    match state.keep_alive {
        Some(interval) => sse.keep_alive(KeepAlive::new().interval(interval)).into_response(),
        None => sse.into_response(),
    }
}
