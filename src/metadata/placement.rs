//! Cloud placement facts.

/// Where this instance runs, as reported by the metadata service at startup.
///
/// Built once before the listener starts and shared read-only afterwards.
/// A field is `None` when its lookup failed or never ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementInfo {
    pub region: Option<String>,
    pub availability_zone: Option<String>,
}

impl PlacementInfo {
    pub fn new(region: Option<String>, availability_zone: Option<String>) -> Self {
        Self {
            region,
            availability_zone,
        }
    }

    /// Placement with no facts, used when the fetch is disabled.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or_default()
    }

    pub fn availability_zone(&self) -> &str {
        self.availability_zone.as_deref().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_none() && self.availability_zone.is_none()
    }
}
