//! Request handlers.
//!
//! Each handler is a linear pipeline:
//! receive → (optional delay) → collect identity → render → respond.
//! Nothing is shared between requests except read-only placement facts.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
};

use crate::http::delay;
use crate::http::request::RequestSnapshot;
use crate::http::response::{self, HandlerError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::render::{render_structured, render_text};

pub const TEXT_ROUTE: &str = "text";
pub const API_ROUTE: &str = "api";

/// Text identity dump plus request echo. Serves every path except `/api`.
pub async fn whoami_handler(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let result = serve_text(&state, remote_addr, request).await;
    finish(TEXT_ROUTE, start, result)
}

/// Structured JSON identity document.
pub async fn api_handler(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let (parts, _body) = request.into_parts();
    let snapshot = RequestSnapshot::from_parts(&parts, remote_addr);

    tracing::debug!(
        method = %snapshot.method,
        url = %snapshot.url,
        remote_addr = %snapshot.remote_addr,
        "Rendering structured identity"
    );

    let identity = state.collector.collect();
    let result = render_structured(&identity, &state.placement, &snapshot)
        .map(response::json)
        .map_err(HandlerError::from);
    finish(API_ROUTE, start, result)
}

async fn serve_text(
    state: &AppState,
    remote_addr: SocketAddr,
    request: Request<Body>,
) -> Result<Response, HandlerError> {
    let query = request.uri().query().map(str::to_owned);
    delay::maybe_delay(query.as_deref()).await;

    let identity = state.collector.collect();
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, state.max_echo_body_bytes)
        .await
        .map_err(HandlerError::ReadBody)?;

    tracing::debug!(
        method = %parts.method,
        uri = %parts.uri,
        remote_addr = %remote_addr,
        body_len = body.len(),
        "Rendering text identity"
    );

    let rendered = render_text(&identity, &remote_addr, &parts, &body)?;
    Ok(response::text(rendered))
}

fn finish(route: &'static str, start: Instant, result: Result<Response, HandlerError>) -> Response {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(route = route, error = %e, "Request failed");
            e.into_response()
        }
    };
    metrics::record_request(route, response.status().as_u16(), start);
    response
}
