use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::relay::{router, AppState};

/// The relay bound to its routes, waiting for a listener.
pub struct RelayServer {
    app: Router,
}

impl RelayServer {
    pub fn new(state: AppState) -> Self {
        Self {
            app: router(state),
        }
    }

    /// Serves until Ctrl-C or SIGTERM, letting in-flight relays finish.
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        if let Ok(addr) = listener.local_addr() {
            info!("Listening on {}", addr);
        }
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server");
}
