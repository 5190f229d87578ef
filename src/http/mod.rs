//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs (`/api` → structured, everything else → text)
//!     → delay.rs (optional `wait`, text route only)
//!     → request.rs (snapshot, host, canonical header keys)
//!     → render subsystem
//!     → response.rs (content type, 500 on failure)
//!     → Send to client
//! ```

pub mod delay;
pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::RequestSnapshot;
pub use response::HandlerError;
pub use server::{AppState, HttpServer};
