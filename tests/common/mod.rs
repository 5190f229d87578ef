//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use whoami_server::config::ServerConfig;
use whoami_server::http::HttpServer;
use whoami_server::lifecycle::Shutdown;
use whoami_server::PlacementInfo;

/// Config bound to an ephemeral loopback port with metadata disabled.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.listener.bind_host = "127.0.0.1".to_string();
    config.listener.port = 0;
    config.metadata.enabled = false;
    config
}

/// Start the server in the background. Returns its address and the
/// shutdown handle that stops it.
pub async fn start_server(config: ServerConfig, placement: PlacementInfo) -> (SocketAddr, Shutdown) {
    let (addr, shutdown, _) = spawn_server(config, placement).await;
    (addr, shutdown)
}

/// Like `start_server`, also returning the task running the server so
/// tests can observe when it exits.
pub async fn spawn_server(
    config: ServerConfig,
    placement: PlacementInfo,
) -> (SocketAddr, Shutdown, JoinHandle<std::io::Result<()>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, placement);
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    (addr, shutdown, handle)
}

/// Start a mock metadata service. Region and AZ bodies are served verbatim;
/// `None` makes that path return 404.
pub async fn start_mock_metadata(
    region: Option<&'static str>,
    az: Option<&'static str>,
) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route(
            "/latest/meta-data/placement/region",
            get(move || async move { region.ok_or(StatusCode::NOT_FOUND) }),
        )
        .route(
            "/latest/meta-data/placement/availability-zone",
            get(move || async move { az.ok_or(StatusCode::NOT_FOUND) }),
        );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Client that never reuses connections or goes through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
