//! Interface address shapes.

use std::net::IpAddr;

/// An address bound to a network interface, as reported by the OS.
///
/// Most platforms report a network address with a prefix length; some
/// (point-to-point links, sandboxed environments) only report the bare
/// address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceAddr {
    /// Address with its network prefix, e.g. `10.0.0.5/24`.
    Network { ip: IpAddr, prefix_len: u8 },
    /// Address without any network information.
    Bare(IpAddr),
}

impl InterfaceAddr {
    /// The IP component, whatever the shape.
    pub fn ip(&self) -> IpAddr {
        match *self {
            InterfaceAddr::Network { ip, .. } | InterfaceAddr::Bare(ip) => ip,
        }
    }
}

/// One `(interface, address)` pair discovered on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFact {
    pub interface: String,
    pub ip: IpAddr,
}

impl NetworkFact {
    pub fn new(interface: impl Into<String>, addr: InterfaceAddr) -> Self {
        Self {
            interface: interface.into(),
            ip: addr.ip(),
        }
    }
}
