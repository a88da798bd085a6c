//! OS signal handling.

use crate::lifecycle::Shutdown;

/// Wait for Ctrl+C and trigger shutdown.
///
/// If the signal handler cannot be installed, shutdown is triggered
/// immediately rather than leaving the process unstoppable.
pub async fn watch_signals(shutdown: &Shutdown) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
    } else {
        tracing::info!("Shutdown signal received");
    }
    shutdown.trigger();
}
