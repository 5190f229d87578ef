//! Cloud placement metadata.
//!
//! # Data Flow
//! ```text
//! startup
//!     → fetcher.rs (two best-effort GETs against the metadata service)
//!     → placement.rs (PlacementInfo, write-once)
//!     → Arc<PlacementInfo> in the HTTP application state (read-only)
//! ```

pub mod fetcher;
pub mod placement;

pub use fetcher::{fetch_placement, MetadataError, MetadataFetcher};
pub use placement::PlacementInfo;
