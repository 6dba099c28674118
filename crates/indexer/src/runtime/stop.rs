//! Stop — turn Ctrl+C / SIGTERM into a cancellation.

use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Cancel `cancel` on the first shutdown signal.
pub async fn cancel_on_shutdown(cancel: CancellationToken) {
    shutdown_signal().await;
    cancel.cancel();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, stopping after the current line...");
        },
        _ = terminate => {
            warn!("Received SIGTERM, stopping after the current line...");
        },
    }
}
