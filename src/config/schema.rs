//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Well-known base URL of the instance metadata service.
pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254/latest/meta-data";

/// Root configuration for the identity responder.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// Placement metadata lookup settings.
    pub metadata: MetadataConfig,

    /// Per-request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// TCP port to listen on.
    pub port: u16,
}

impl ListenerConfig {
    /// The `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        if self.bind_host.contains(':') && !self.bind_host.starts_with('[') {
            format!("[{}]:{}", self.bind_host, self.port)
        } else {
            format!("{}:{}", self.bind_host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Placement metadata configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Fetch placement metadata at startup.
    pub enabled: bool,

    /// Base URL; `/placement/region` and `/placement/availability-zone`
    /// are appended to it.
    pub base_url: String,

    /// TCP connect timeout in milliseconds. Bounds startup on hosts with
    /// no metadata service.
    pub connect_timeout_ms: u64,

    /// Total per-lookup timeout in milliseconds (none by default).
    pub timeout_ms: Option<u64>,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: DEFAULT_METADATA_URL.to_string(),
            connect_timeout_ms: 2_000,
            timeout_ms: None,
        }
    }
}

/// Per-request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest request body echoed back by the text route.
    pub max_echo_body_bytes: usize,

    /// Optional overall request timeout in seconds. Applies to `wait` too.
    pub request_timeout_secs: Option<u64>,

    /// How long in-flight requests may keep running after a shutdown
    /// signal before they are abandoned.
    pub shutdown_grace_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_echo_body_bytes: 1024 * 1024,
            request_timeout_secs: None,
            shutdown_grace_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log output format.
    pub log_format: LogFormat,

    /// Default filter directives; `RUST_LOG` takes precedence.
    pub log_filter: String,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address the Prometheus exporter listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            log_filter: "whoami_server=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
