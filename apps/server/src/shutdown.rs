use axum_server::Handle;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// Waits for Ctrl+C or SIGTERM, then asks `handle` to drain within `grace`.
pub(crate) async fn drain_on_signal(handle: Handle<SocketAddr>, grace: Duration) {
    if let Err(e) = wait_for_signal().await {
        error!("Cannot listen for shutdown signals: {e}");
        return;
    }
    info!(grace_secs = grace.as_secs(), "Shutdown signal received, draining connections");
    handle.graceful_shutdown(Some(grace));
}

async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            res = signal::ctrl_c() => res,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await
}
