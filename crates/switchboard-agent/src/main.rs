//! Switchboard worker binary.
//!
//! Loads configuration, validates the department registry (fail-fast:
//! a process with an incomplete registry must not accept calls), and
//! runs the call worker with graceful shutdown on SIGINT/SIGTERM.

use std::sync::Arc;
use switchboard_agent::config;
use switchboard_agent::worker::{IncomingCall, Worker};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("SWITCHBOARD_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the worker cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let registry = Arc::new(config.build_registry().expect(
        "invalid department or control plane configuration — check destination addresses and credentials",
    ));

    tracing::info!(
        departments = registry.entries().len(),
        grace_seconds = config.routing.grace_seconds,
        "starting switchboard worker"
    );

    let (dispatch_tx, dispatch_rx) = mpsc::channel::<IncomingCall>(16);
    let worker = Worker::new(registry, config.livekit.clone(), config.grace_interval());
    let worker_task = tokio::spawn(worker.run(dispatch_rx));

    // The hosting session runtime dispatches calls through `dispatch_tx`;
    // dropping it at shutdown stops the worker loop.
    shutdown_signal().await;
    drop(dispatch_tx);

    worker_task.await.expect("worker task panicked");
    tracing::info!("switchboard worker shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
