//! Response construction.
//!
//! # Responsibilities
//! - Wrap rendered bodies with the right content type
//! - Map handler failures to `500` with the error text as body
//!
//! # Design Decisions
//! - Error bodies are plain text, newline-terminated
//! - A failed request never affects other requests

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::render::RenderError;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// Failure while producing a response body.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error("failed to read request body: {0}")]
    ReadBody(#[source] axum::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], format!("{self}\n")).into_response()
    }
}

/// `200 OK` with a plain-text body.
pub fn text(body: Vec<u8>) -> Response {
    with_content_type(body, TEXT_PLAIN)
}

/// `200 OK` with a JSON body.
pub fn json(body: Vec<u8>) -> Response {
    with_content_type(body, APPLICATION_JSON)
}

fn with_content_type(body: Vec<u8>, content_type: &'static str) -> Response {
    let mut response = Response::new(Body::from(body));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_response() {
        let err = HandlerError::Render(RenderError::Echo(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        )));
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"failed to write echoed request: pipe closed\n");
    }

    #[test]
    fn test_content_types() {
        assert_eq!(text(Vec::new()).headers()[header::CONTENT_TYPE], TEXT_PLAIN);
        assert_eq!(json(Vec::new()).headers()[header::CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(json(Vec::new()).status(), StatusCode::OK);
    }
}
