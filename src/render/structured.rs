//! JSON identity document.
//!
//! Sparse encoding: empty strings and an empty header map are omitted.
//! `ip` is always present (possibly `[]`) and `time` is always set to the
//! render instant.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::http::request::RequestSnapshot;
use crate::identity::HostIdentity;
use crate::metadata::PlacementInfo;
use crate::render::RenderError;

/// Body of the `/api` response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiDocument {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub az: String,
    pub ip: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, Vec<String>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub method: String,
    pub time: DateTime<Utc>,
}

impl ApiDocument {
    pub fn new(
        identity: &HostIdentity,
        placement: &PlacementInfo,
        snapshot: &RequestSnapshot,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            hostname: identity.hostname_or_empty().to_string(),
            region: placement.region().to_string(),
            az: placement.availability_zone().to_string(),
            ip: identity.ip_strings(),
            headers: snapshot.headers.clone(),
            url: snapshot.url.clone(),
            host: snapshot.host.clone(),
            method: snapshot.method.clone(),
            time,
        }
    }
}

/// Render the JSON document, newline-terminated.
pub fn render_structured(
    identity: &HostIdentity,
    placement: &PlacementInfo,
    snapshot: &RequestSnapshot,
) -> Result<Vec<u8>, RenderError> {
    let document = ApiDocument::new(identity, placement, snapshot, Utc::now());
    let mut out = serde_json::to_vec(&document)?;
    out.push(b'\n');
    Ok(out)
}
