//! HTTP server lifecycle with graceful shutdown.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::domain::SubscriberRegistry;
use crate::error::ServerError;
use crate::service::ShutdownTrigger;

/// Serves `router` on `listener` until `shutdown` fires.
///
/// On shutdown the registry is closed first, which ends every open SSE
/// stream, then in-flight connections get up to `grace` to finish.
///
/// # Errors
///
/// Returns [`ServerError::Io`] if the server fails while accepting
/// connections.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    registry: Arc<SubscriberRegistry>,
    shutdown: ShutdownTrigger,
    grace: Duration,
) -> Result<(), ServerError> {
    let mut stop = shutdown.listener();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            stop.wait().await;
            registry.shutdown();
        })
        .into_future();

    let mut deadline = shutdown.listener();
    let expired = async move {
        deadline.wait().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result?,
        () = expired => {
            tracing::warn!(grace_secs = grace.as_secs(), "graceful shutdown timed out");
        }
    }
    Ok(())
}
