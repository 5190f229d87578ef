//! Startup orchestration.
//!
//! # Responsibilities
//! - Fetch placement metadata (once, best-effort)
//! - Start the metrics exporter when enabled
//! - Bind the listener and build the HTTP server
//!
//! # Design Decisions
//! - Placement is fetched before the listener binds, so no request ever
//!   observes it half-populated
//! - Bind and exporter failures are fatal; metadata failures are not

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::metadata::fetch_placement;
use crate::observability::metrics;

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),
}

/// A server ready to run on a bound listener.
pub struct Prepared {
    pub server: HttpServer,
    pub listener: TcpListener,
}

impl Prepared {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Initialize subsystems in order and bind the listener.
pub async fn prepare(config: ServerConfig) -> Result<Prepared, StartupError> {
    let placement = fetch_placement(&config.metadata).await;

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let address = config.listener.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    if let Ok(local_addr) = listener.local_addr() {
        tracing::info!(address = %local_addr, "Listening for connections");
    }

    Ok(Prepared {
        server: HttpServer::new(config, placement),
        listener,
    })
}
