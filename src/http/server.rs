//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, optional timeout)
//! - Serve connections until shutdown is signalled

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, oneshot};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::handlers::{api_handler, whoami_handler};
use crate::identity::IdentityCollector;
use crate::metadata::PlacementInfo;

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub collector: IdentityCollector,
    pub placement: Arc<PlacementInfo>,
    pub max_echo_body_bytes: usize,
}

/// HTTP server for the identity responder.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server reading identity facts from the operating system.
    pub fn new(config: ServerConfig, placement: PlacementInfo) -> Self {
        Self::with_collector(config, placement, IdentityCollector::system())
    }

    /// Create a server with a custom identity collector.
    pub fn with_collector(
        config: ServerConfig,
        placement: PlacementInfo,
        collector: IdentityCollector,
    ) -> Self {
        let state = AppState {
            collector,
            placement: Arc::new(placement),
            max_echo_body_bytes: config.limits.max_echo_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let router = Router::new()
            .route("/api", any(api_handler))
            .fallback(whoami_handler)
            .with_state(state);

        let router = match config.limits.request_timeout_secs {
            Some(secs) => router.layer(TimeoutLayer::new(Duration::from_secs(secs))),
            None => router,
        };

        router.layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// After the shutdown signal, in-flight requests get
    /// `limits.shutdown_grace_secs` to finish. Whatever is still running
    /// after that (typically a long `wait`) is abandoned.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let grace = Duration::from_secs(self.config.limits.shutdown_grace_secs);
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
        let serve = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!(grace = ?grace, "Shutdown signal received, draining");
                let _ = signalled_tx.send(());
            })
            .into_future();

        let drain_deadline = async move {
            match signalled_rx.await {
                Ok(()) => tokio::time::sleep(grace).await,
                Err(_) => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            result = serve => result?,
            _ = drain_deadline => {
                tracing::warn!(grace = ?grace, "Drain period elapsed, abandoning in-flight requests");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::collector::tests::fake_collector;
    use axum::{
        body::Body,
        extract::connect_info::MockConnectInfo,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_router(placement: PlacementInfo) -> Router {
        HttpServer::with_collector(ServerConfig::default(), placement, fake_collector())
            .router()
            .layer(MockConnectInfo(SocketAddr::from(([192, 0, 2, 10], 40000))))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_text_route() {
        let response = test_router(PlacementInfo::unknown())
            .oneshot(
                Request::builder()
                    .uri("/anything/here?x=1")
                    .header("Host", "example.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let text = body_string(response).await;
        assert!(text.starts_with(
            "Hostname: node-a\n\
             IP: 127.0.0.1\n\
             IP: ::1\n\
             IP: 10.0.0.5\n\
             IP: 127.0.0.1\n\
             RemoteAddr: 192.0.2.10:40000\n\
             GET /anything/here?x=1 HTTP/1.1\r\n\
             Host: example.com\r\n"
        ));
    }

    #[tokio::test]
    async fn test_api_route() {
        let placement = PlacementInfo::new(Some("eu-west-1".into()), Some("eu-west-1b".into()));
        let response = test_router(placement)
            .oneshot(
                Request::builder()
                    .uri("/api")
                    .header("Host", "example.com")
                    .header("X-Test", "a")
                    .header("X-Test", "b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let doc: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(doc["hostname"], "node-a");
        assert_eq!(doc["region"], "eu-west-1");
        assert_eq!(doc["az"], "eu-west-1b");
        assert_eq!(doc["method"], "GET");
        assert_eq!(doc["host"], "example.com");
        assert_eq!(doc["headers"]["X-Test"], serde_json::json!(["a", "b"]));
        assert_eq!(
            doc["ip"],
            serde_json::json!(["127.0.0.1", "::1", "10.0.0.5", "127.0.0.1"])
        );
    }

    #[tokio::test]
    async fn test_api_ignores_wait() {
        let start = std::time::Instant::now();
        let response = test_router(PlacementInfo::unknown())
            .oneshot(
                Request::builder()
                    .uri("/api?wait=5s")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_oversized_body_is_server_error() {
        let mut config = ServerConfig::default();
        config.limits.max_echo_body_bytes = 4;
        let router = HttpServer::with_collector(config, PlacementInfo::unknown(), fake_collector())
            .router()
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 1234))));

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .body(Body::from("far too long"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let text = body_string(response).await;
        assert!(text.starts_with("failed to read request body"));
        assert!(text.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_echoes_post_body() {
        let response = test_router(PlacementInfo::unknown())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/submit")
                    .header("Host", "svc")
                    .header("Content-Length", "5")
                    .body(Body::from("hello"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let text = body_string(response).await;
        assert!(text.ends_with(
            "POST /submit HTTP/1.1\r\n\
             Host: svc\r\n\
             Content-Length: 5\r\n\
             \r\n\
             hello"
        ));
    }
}
