//! Startup lookup of placement metadata.
//!
//! # Responsibilities
//! - GET `{base}/placement/region` and `{base}/placement/availability-zone`
//! - Use each response body verbatim as the value
//! - Turn failures into absent fields, logging each one once
//!
//! # Design Decisions
//! - Runs exactly once, before the listener accepts traffic
//! - No retries; a failed field stays empty for the process lifetime
//! - Non-2xx responses count as failures

use std::time::Duration;

use crate::config::MetadataConfig;
use crate::metadata::placement::PlacementInfo;
use crate::observability::metrics;

pub const REGION_PATH: &str = "placement/region";
pub const AVAILABILITY_ZONE_PATH: &str = "placement/availability-zone";

/// Error type for a single metadata lookup.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to build metadata client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("metadata request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("metadata service returned {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("failed to read metadata body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Client for the instance metadata service.
#[derive(Debug, Clone)]
pub struct MetadataFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl MetadataFetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let mut builder = reqwest::Client::builder()
            .no_proxy()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms));
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build().map_err(MetadataError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a single metadata value; the body is returned untouched.
    pub async fn lookup(&self, path: &str) -> Result<String, MetadataError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| MetadataError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::Status { url, status });
        }

        response
            .text()
            .await
            .map_err(|source| MetadataError::Body { url, source })
    }

    /// Fetch both placement facts. Never fails; failed fields are `None`.
    pub async fn fetch(&self) -> PlacementInfo {
        let (region, az) = tokio::join!(
            self.lookup(REGION_PATH),
            self.lookup(AVAILABILITY_ZONE_PATH)
        );

        PlacementInfo::new(
            settle("region", region),
            settle("availability_zone", az),
        )
    }
}

fn settle(field: &'static str, result: Result<String, MetadataError>) -> Option<String> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(field = field, error = %e, "Placement lookup failed");
            metrics::record_placement_failure(field);
            None
        }
    }
}

/// Fetch placement according to configuration.
///
/// Returns empty placement when fetching is disabled or the client cannot
/// be built.
pub async fn fetch_placement(config: &MetadataConfig) -> PlacementInfo {
    if !config.enabled {
        tracing::info!("Placement metadata lookup disabled");
        return PlacementInfo::unknown();
    }

    let fetcher = match MetadataFetcher::new(config) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::warn!(error = %e, "Placement lookup skipped");
            return PlacementInfo::unknown();
        }
    };

    let placement = fetcher.fetch().await;
    if let Some(region) = &placement.region {
        tracing::info!(region = %region, "Region");
    }
    if let Some(az) = &placement.availability_zone {
        tracing::info!(az = %az, "AZ");
    }
    placement
}
