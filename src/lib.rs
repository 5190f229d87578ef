//! Network identity responder library.
//!
//! Answers every HTTP request with facts about the serving host and the
//! request itself, optionally after an injected delay.

// Core subsystems
pub mod config;
pub mod http;
pub mod identity;
pub mod metadata;
pub mod render;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use metadata::PlacementInfo;
