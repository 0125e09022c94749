//! HTTP listener and shutdown handling

use anyhow::{Context, Result};
use argonaut_core::Config;
use axum::Router;
use tokio::net::TcpListener;

/// Bind the configured port and serve `app` until SIGINT or SIGTERM.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let limits = config.upload_limits();
    let mut blocked: Vec<&str> = limits.blocked_extensions.iter().map(String::as_str).collect();
    blocked.sort_unstable();
    tracing::info!(
        addr = %addr,
        max_file_bytes = limits.max_file_size_bytes,
        max_files_per_request = limits.max_files_per_request,
        max_files_per_account = limits.max_files_per_account,
        blocked_extensions = %blocked.join(","),
        content_root = %config.content_root().display(),
        "Accepting uploads"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server terminated with an error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
///
/// # Panics
/// If a signal handler cannot be installed.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    };

    tracing::info!(signal, "Draining in-flight requests");
}
