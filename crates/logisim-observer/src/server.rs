//! Observer HTTP server lifecycle.
//!
//! [`start_server`] binds the listener, serves the router, and returns
//! once Ctrl-C is received and in-flight requests have drained.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use logisim_core::ObserverConfig;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Where the Observer server listens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: IpAddr,
    /// TCP port.
    pub port: u16,
}

impl ServerConfig {
    /// The socket address to bind.
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&ObserverConfig::default())
    }
}

impl From<&ObserverConfig> for ServerConfig {
    fn from(config: &ObserverConfig) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: config.port,
        }
    }
}

/// Serve the Observer API until shutdown.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the port is unavailable and
/// [`ServerError::Serve`] on a fatal I/O error while serving.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr = config.addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "observer listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServerError::Serve { source })?;

    info!(%addr, "observer stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

/// Failures starting or running the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listener could not bind.
    #[error("cannot bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The server failed while running.
    #[error("observer server failed: {source}")]
    Serve {
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_follows_observer_port() {
        let observer = ObserverConfig {
            enabled: true,
            port: 9_191,
        };
        let config = ServerConfig::from(&observer);
        assert_eq!(config.addr().port(), 9_191);
        assert!(config.host.is_unspecified());
    }
}
