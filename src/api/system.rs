//! System endpoints: health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    subscribers: usize,
    timestamp: String,
    version: &'static str,
}

/// `GET /health` — Service health and live subscriber count.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let status = if state.registry.is_open() {
        "healthy"
    } else {
        "shutting_down"
    };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status,
            subscribers: state.registry.len(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::SubscriberRegistry;

    async fn health_json(state: AppState) -> serde_json::Value {
        let app = routes().with_state(state);
        let Ok(request) = Request::builder().uri("/health").body(Body::empty()) else {
            panic!("valid request");
        };
        let response = app.oneshot(request).await.unwrap_or_else(|e| match e {});
        assert_eq!(response.status(), StatusCode::OK);
        let Ok(bytes) = to_bytes(response.into_body(), usize::MAX).await else {
            panic!("readable body");
        };
        serde_json::from_slice(&bytes).unwrap_or_default()
    }

    #[tokio::test]
    async fn reports_subscriber_count() {
        let registry = Arc::new(SubscriberRegistry::new());
        let _a = registry.register();
        let _b = registry.register();

        let json = health_json(AppState::new(Arc::clone(&registry))).await;
        assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("healthy"));
        assert_eq!(json.get("subscribers").and_then(|v| v.as_u64()), Some(2));
    }

    #[tokio::test]
    async fn reports_shutdown() {
        let registry = Arc::new(SubscriberRegistry::new());
        registry.shutdown();

        let json = health_json(AppState::new(registry)).await;
        assert_eq!(
            json.get("status").and_then(|v| v.as_str()),
            Some("shutting_down")
        );
    }
}
