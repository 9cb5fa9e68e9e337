//! Server lifecycle: bind, serve, graceful shutdown.

use crate::{routes::create_router, state::AppState};
use gateway_config::ServerSettings;
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

/// Server error.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// Address that failed.
        addr: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The accept loop failed.
    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// HTTP server for the relay gateway.
pub struct Server {
    settings: ServerSettings,
    state: AppState,
}

impl Server {
    /// Create a server.
    pub fn new(settings: ServerSettings, state: AppState) -> Self {
        Self { settings, state }
    }

    /// Address the server listens on.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.settings.host, self.settings.port)
    }

    /// Serve until Ctrl-C or SIGTERM, then drain for at most the configured
    /// shutdown timeout. Open streams are cancelled when the signal arrives.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = %addr, local = ?local, "Relay gateway listening");

        let shutdown = self.state.shutdown.clone();
        let stopping = shutdown.clone();
        let router = create_router(self.state);
        let serve = axum::serve(listener, router)
            .with_graceful_shutdown(async move { stopping.cancelled().await })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            result = &mut serve => return result.map_err(ServerError::Serve),
            signal_name = shutdown_signal() => {
                info!(signal = signal_name, "Received shutdown signal");
            }
        }

        shutdown.cancel();
        match tokio::time::timeout(self.settings.shutdown_timeout, serve).await {
            Ok(result) => result.map_err(ServerError::Serve)?,
            Err(_) => warn!(
                timeout = ?self.settings.shutdown_timeout,
                "Graceful shutdown timed out, dropping open connections"
            ),
        }
        info!("Relay gateway stopped");
        Ok(())
    }
}

/// Resolve when the process receives Ctrl-C or SIGTERM.
///
/// A handler that cannot be installed is logged and never fires.
pub async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        "ctrl+c"
    };

    #[cfg(unix)]
    let sigterm = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
        "sigterm"
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<&'static str>();

    tokio::select! {
        name = ctrl_c => name,
        name = sigterm => name,
    }
}
