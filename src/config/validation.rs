//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports, limits, timeouts)
//! - Check that addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ServerConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.port must be non-zero")]
    ZeroPort,

    #[error("listener address {0:?} is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("metadata.base_url {url:?} is invalid: {reason}")]
    InvalidMetadataUrl { url: String, reason: String },

    #[error("limits.max_echo_body_bytes must be non-zero")]
    ZeroBodyLimit,

    #[error("limits.request_timeout_secs must be non-zero when set")]
    ZeroRequestTimeout,

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let bind_address = config.listener.bind_address();
    if bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(bind_address));
    }

    if config.metadata.enabled {
        if let Err(reason) = check_metadata_url(&config.metadata.base_url) {
            errors.push(ValidationError::InvalidMetadataUrl {
                url: config.metadata.base_url.clone(),
                reason,
            });
        }
    }

    if config.limits.max_echo_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.limits.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_metadata_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme {other:?}")),
    }
}
