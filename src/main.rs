//! whoami-server
//!
//! Reports which instance served a request: hostname, interface addresses,
//! cloud placement, and an echo of the request itself.
//!
//! ```text
//!     Client Request   ┌──────────┐   ┌──────────────┐   ┌──────────┐
//!     ────────────────▶│  http    │──▶│   identity   │──▶│  render  │
//!                      │ handlers │   │  collector   │   │ text/json│
//!                      └────┬─────┘   └──────────────┘   └────┬─────┘
//!                           │ wait=?                          │
//!                           ▼                                 │
//!                      ┌──────────┐   ┌──────────────┐        │
//!                      │  delay   │   │  placement   │────────┘
//!                      └──────────┘   │ (startup)    │
//!                                     └──────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use whoami_server::config::{loader, LogFormat, ServerConfig};
use whoami_server::lifecycle::{self, signals, Shutdown};
use whoami_server::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "whoami-server", version)]
#[command(about = "HTTP responder reporting host identity and echoing requests", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port number to listen on
    #[arg(long, env = "PORT_NUMBER")]
    port: Option<u16>,

    /// Host or IP to bind
    #[arg(long, env = "BIND_HOST")]
    bind_host: Option<String>,

    /// Base URL of the instance metadata service
    #[arg(long, env = "METADATA_URL")]
    metadata_url: Option<String>,

    /// Skip the placement metadata lookup
    #[arg(long)]
    no_metadata: bool,

    /// Log format: pretty or json
    #[arg(long, env = "LOG_FORMAT", value_parser = parse_log_format)]
    log_format: Option<LogFormat>,

    /// Serve Prometheus metrics on this address
    #[arg(long, env = "METRICS_ADDRESS")]
    metrics_address: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(bind_host) = self.bind_host {
            config.listener.bind_host = bind_host;
        }
        if let Some(metadata_url) = self.metadata_url {
            config.metadata.base_url = metadata_url;
        }
        if self.no_metadata {
            config.metadata.enabled = false;
        }
        if let Some(log_format) = self.log_format {
            config.observability.log_format = log_format;
        }
        if let Some(metrics_address) = self.metrics_address {
            config.observability.metrics_enabled = true;
            config.observability.metrics_address = metrics_address;
        }
    }
}

fn parse_log_format(raw: &str) -> Result<LogFormat, String> {
    match raw.to_ascii_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        other => Err(format!("unknown log format {other:?} (expected pretty or json)")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => loader::read_config(path)?,
        None => ServerConfig::default(),
    };
    cli.apply(&mut config);
    loader::validate(&config)?;

    logging::init_logging(&config.observability);

    tracing::info!("whoami-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        metadata_enabled = config.metadata.enabled,
        metadata_url = %config.metadata.base_url,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let prepared = lifecycle::prepare(config).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(&shutdown);

    prepared
        .server
        .run(prepared.listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "whoami-server",
            "--port",
            "9001",
            "--no-metadata",
            "--log-format",
            "json",
            "--metrics-address",
            "127.0.0.1:9100",
        ]);

        let mut config = ServerConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.listener.port, 9001);
        assert!(!config.metadata.enabled);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert!(config.observability.metrics_enabled);
        assert_eq!(config.observability.metrics_address, "127.0.0.1:9100");
    }

    #[test]
    fn test_bad_log_format() {
        assert!(parse_log_format("xml").is_err());
        assert_eq!(parse_log_format("JSON"), Ok(LogFormat::Json));
    }
}
