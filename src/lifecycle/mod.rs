//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Fetch placement → Start metrics → Bind listener → Build server
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain (bounded by grace) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: placement first, listener last
//! - In-flight requests may finish during `limits.shutdown_grace_secs`;
//!   longer ones, e.g. a huge `wait`, are abandoned

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{prepare, Prepared, StartupError};
