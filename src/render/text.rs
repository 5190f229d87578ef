//! Plain-text identity dump with request echo.
//!
//! Output layout:
//! ```text
//! Hostname: <hostname>
//! IP: <ip>              (one line per address, collector order)
//! RemoteAddr: <addr>
//! <METHOD> <path?query> HTTP/1.1
//! Host: <host>
//! <headers...>
//!
//! <body>
//! ```
//! Only the bare IP is printed per address line; scrapers of this output
//! rely on that format.

use std::io::{self, Write};
use std::net::SocketAddr;

use axum::http::{header, request::Parts, HeaderMap};

use crate::http::request::{canonical_header_key, request_host, request_uri};
use crate::identity::HostIdentity;
use crate::render::RenderError;

/// Render the text document for one request.
pub fn render_text(
    identity: &HostIdentity,
    remote_addr: &SocketAddr,
    parts: &Parts,
    body: &[u8],
) -> Result<Vec<u8>, RenderError> {
    let mut out = Vec::with_capacity(256 + body.len());

    writeln!(out, "Hostname: {}", identity.hostname_or_empty())?;
    for fact in &identity.addresses {
        writeln!(out, "IP: {}", fact.ip)?;
    }
    writeln!(out, "RemoteAddr: {}", remote_addr)?;
    write_echo(&mut out, parts, body)?;

    Ok(out)
}

/// Serialize a request in HTTP/1.1 wire form.
///
/// `Host` comes first, then the remaining headers grouped by name in
/// first-arrival order, each name's values in arrival order. A body that
/// arrived chunked is re-framed as a single chunk.
pub fn write_echo<W: Write>(out: &mut W, parts: &Parts, body: &[u8]) -> io::Result<()> {
    write!(out, "{} {} HTTP/1.1\r\n", parts.method, request_uri(&parts.uri))?;
    write!(out, "Host: {}\r\n", request_host(parts))?;

    for (name, value) in parts.headers.iter() {
        if name == header::HOST {
            continue;
        }
        write!(out, "{}: ", canonical_header_key(name.as_str()))?;
        out.write_all(value.as_bytes())?;
        out.write_all(b"\r\n")?;
    }
    out.write_all(b"\r\n")?;

    if is_chunked(&parts.headers) {
        if !body.is_empty() {
            write!(out, "{:x}\r\n", body.len())?;
            out.write_all(body)?;
            out.write_all(b"\r\n")?;
        }
        out.write_all(b"0\r\n\r\n")?;
    } else {
        out.write_all(body)?;
    }

    Ok(())
}

fn is_chunked(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::TRANSFER_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .last()
        .is_some_and(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
}
