//! Artificial response delay driven by the `wait` query parameter.
//!
//! Invalid or missing values are ignored, never rejected. The sleep is a
//! Tokio timer, so only the task serving this request is suspended.

use std::time::Duration;

use crate::observability::metrics;

/// Query parameter carrying the delay, e.g. `?wait=250ms`.
pub const WAIT_PARAM: &str = "wait";

/// Parse the first `wait` parameter of a raw query string.
///
/// Accepts `humantime` durations (`500ms`, `1.5s`, `1m 30s`). The grammar
/// is wider than Go-style durations: unit words such as `2 days` or `1M`
/// (months) are accepted too.
pub fn parse_wait(query: Option<&str>) -> Option<Duration> {
    let (_, raw) = url::form_urlencoded::parse(query?.as_bytes()).find(|(k, _)| k == WAIT_PARAM)?;
    if raw.is_empty() {
        return None;
    }
    humantime::parse_duration(&raw).ok()
}

/// Sleep for the requested delay, if any. Returns the delay applied.
pub async fn maybe_delay(query: Option<&str>) -> Option<Duration> {
    let delay = parse_wait(query)?;
    tracing::debug!(delay = ?delay, "Injecting response delay");
    metrics::record_delay(delay);
    tokio::time::sleep(delay).await;
    Some(delay)
}
