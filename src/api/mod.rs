//! HTTP surface: router composition, system endpoints, static files.
//!
//! | Route       | Handler                                   |
//! |-------------|-------------------------------------------|
//! | `/events`   | SSE stream ([`crate::sse::events_handler`]) |
//! | `/health`   | [`system::health_handler`]                |
//! | anything else | static file from the configured directory |

pub mod system;

use std::path::Path;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::sse::events_handler;

/// Builds the complete application router.
///
/// Unmatched paths fall through to `static_dir`; `/` and directories
/// resolve to their `index.html`. Paths escaping the directory are
/// rejected and missing files return 404.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    let static_files = ServeDir::new(static_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/events", get(events_handler))
        .merge(system::routes())
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
