//! sse-repl entry point.
//!
//! Starts the Axum server on the Tokio runtime and the operator console
//! on a dedicated OS thread.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sse_repl::api;
use sse_repl::app_state::AppState;
use sse_repl::config::ServerConfig;
use sse_repl::domain::SubscriberRegistry;
use sse_repl::error::ServerError;
use sse_repl::repl;
use sse_repl::server::serve;
use sse_repl::service::{ShutdownTrigger, publisher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the console prompt on stdout stays readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::load();
    let static_dir = config
        .prepare_static_dir()
        .context("failed to prepare static directory")?;

    // Build domain and service layers
    let registry = Arc::new(SubscriberRegistry::with_policy(config.queue_policy()));
    let shutdown = ShutdownTrigger::new();
    let (publisher, coordinator) = publisher::channel(Arc::clone(&registry));
    tokio::spawn(coordinator.run(shutdown.listener()));

    // Build router
    let state = AppState::new(Arc::clone(&registry)).with_keep_alive(config.keep_alive());
    let app = api::build_router(state, &static_dir);

    // Bind before starting the console so the operator only sees a prompt
    // once clients can connect.
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(
        addr = %listener.local_addr()?,
        dir = %static_dir.display(),
        policy = ?registry.policy(),
        "server listening"
    );

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.trigger();
        }
    });

    repl::spawn(publisher, shutdown.clone()).context("failed to start console thread")?;

    serve(listener, app, registry, shutdown, config.shutdown_grace()).await?;
    tracing::info!("server stopped");

    Ok(())
}
