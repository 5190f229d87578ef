//! Response rendering.
//!
//! # Data Flow
//! ```text
//! HostIdentity + request
//!     → text.rs (identity lines + verbatim request echo)
//!     → structured.rs (sparse JSON document, adds PlacementInfo)
//!     → bytes handed back to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - Renderers are pure: all inputs are passed in, output is a buffer
//! - The HTTP layer maps `RenderError` to a 500 with the error text

pub mod structured;
pub mod text;

pub use structured::{render_structured, ApiDocument};
pub use text::{render_text, write_echo};

/// Error type for rendering a response body.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write echoed request: {0}")]
    Echo(#[from] std::io::Error),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}
