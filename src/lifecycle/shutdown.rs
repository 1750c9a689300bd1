//! Shutdown coordination for the gateway.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that all long-running tasks can subscribe to.
#[derive(Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Trigger shutdown once SIGINT or SIGTERM arrives.
    pub fn trigger_on_signal(&self) -> JoinHandle<()> {
        let shutdown = self.clone();
        tokio::spawn(async move {
            os_signal().await;
            shutdown.trigger();
        })
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn os_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received, shutting down"),
        _ = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}

/// Resolves when `rx` fires or its coordinator is dropped.
pub async fn wait_for_shutdown(mut rx: broadcast::Receiver<()>) {
    let _ = rx.recv().await;
    tracing::info!("Shutdown requested");
}
