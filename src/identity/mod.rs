//! Host identity subsystem.
//!
//! # Data Flow
//! ```text
//! per request:
//!     → collector.rs (hostname + interface table via HostProbe)
//!     → address.rs (address shape → bare IP)
//!     → HostIdentity handed to the renderers
//! ```

pub mod address;
pub mod collector;

pub use address::{InterfaceAddr, NetworkFact};
pub use collector::{HostIdentity, HostProbe, IdentityCollector, InterfaceRecord, SystemProbe};
