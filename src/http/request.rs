//! Request inspection.
//!
//! # Responsibilities
//! - Build the per-request `RequestSnapshot` for the structured route
//! - Resolve request-target and host the way they appear on the wire
//! - Canonicalize header keys (`x-test` → `X-Test`)
//!
//! # Design Decisions
//! - Host is reported separately and never appears in the header map
//! - Header values are decoded lossily; a non-UTF-8 value never fails a request
//! - Values of a repeated header keep their arrival order

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::http::{header, request::Parts, Uri};
use chrono::{DateTime, Utc};

/// Read-only view of an incoming request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    pub remote_addr: SocketAddr,
    pub method: String,
    /// Path and query, e.g. `/api?x=1`.
    pub url: String,
    pub host: String,
    /// Canonical key → values in arrival order. Excludes `Host`.
    pub headers: BTreeMap<String, Vec<String>>,
    pub received_at: DateTime<Utc>,
}

impl RequestSnapshot {
    pub fn from_parts(parts: &Parts, remote_addr: SocketAddr) -> Self {
        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in parts.headers.iter() {
            if name == header::HOST {
                continue;
            }
            headers
                .entry(canonical_header_key(name.as_str()))
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        Self {
            remote_addr,
            method: parts.method.as_str().to_string(),
            url: request_uri(&parts.uri).to_string(),
            host: request_host(parts),
            headers,
            received_at: Utc::now(),
        }
    }
}

/// The request-target as sent on an HTTP/1.1 request line.
pub fn request_uri(uri: &Uri) -> &str {
    uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/")
}

/// `Host` header, falling back to the URI authority (HTTP/2 `:authority`).
pub fn request_host(parts: &Parts) -> String {
    parts
        .headers
        .get(header::HOST)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_default()
}

/// MIME-canonical form of a header key.
///
/// The first letter and any letter following a hyphen are upper-cased, the
/// rest lower-cased. Keys with non-token bytes are returned unchanged.
pub fn canonical_header_key(name: &str) -> String {
    if !name.bytes().all(is_token_byte) {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}
