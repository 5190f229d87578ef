//! Live host identity collection.
//!
//! # Responsibilities
//! - Read the hostname
//! - Enumerate interfaces and their bound addresses
//! - Flatten addresses into `NetworkFact`s in OS enumeration order
//!
//! # Design Decisions
//! - Never cached: addresses can change between requests
//! - Best-effort: failures are logged at debug and yield empty values
//! - OS access goes through `HostProbe` so handlers can be tested with a fake

use std::io;
use std::net::IpAddr;
use std::sync::Arc;

use if_addrs::IfAddr;

use crate::identity::address::{InterfaceAddr, NetworkFact};

/// An interface as reported by the OS, with its address listing.
///
/// Address enumeration can fail for a single interface without
/// affecting the others.
#[derive(Debug)]
pub struct InterfaceRecord {
    pub name: String,
    pub addrs: io::Result<Vec<InterfaceAddr>>,
}

/// Source of host identity facts.
pub trait HostProbe: Send + Sync + 'static {
    /// The host name as reported by the OS.
    fn hostname(&self) -> io::Result<String>;

    /// All interfaces, in OS enumeration order.
    fn interfaces(&self) -> io::Result<Vec<InterfaceRecord>>;
}

/// `HostProbe` backed by the running operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl HostProbe for SystemProbe {
    fn hostname(&self) -> io::Result<String> {
        let name = hostname::get()?;
        Ok(name
            .into_string()
            .unwrap_or_else(|raw| raw.to_string_lossy().into_owned()))
    }

    fn interfaces(&self) -> io::Result<Vec<InterfaceRecord>> {
        // getifaddrs yields one entry per address; regroup by interface
        // keeping first-seen order.
        let mut grouped: Vec<(String, Vec<InterfaceAddr>)> = Vec::new();
        for iface in if_addrs::get_if_addrs()? {
            let addr = interface_addr(&iface.addr);
            match grouped.iter_mut().find(|(name, _)| *name == iface.name) {
                Some((_, addrs)) => addrs.push(addr),
                None => grouped.push((iface.name, vec![addr])),
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(name, addrs)| InterfaceRecord {
                name,
                addrs: Ok(addrs),
            })
            .collect())
    }
}

fn interface_addr(addr: &IfAddr) -> InterfaceAddr {
    match addr {
        IfAddr::V4(v4) if v4.netmask.is_unspecified() => InterfaceAddr::Bare(IpAddr::V4(v4.ip)),
        IfAddr::V4(v4) => InterfaceAddr::Network {
            ip: IpAddr::V4(v4.ip),
            prefix_len: u32::from(v4.netmask).count_ones() as u8,
        },
        IfAddr::V6(v6) if v6.netmask.is_unspecified() => InterfaceAddr::Bare(IpAddr::V6(v6.ip)),
        IfAddr::V6(v6) => InterfaceAddr::Network {
            ip: IpAddr::V6(v6.ip),
            prefix_len: u128::from(v6.netmask).count_ones() as u8,
        },
    }
}

/// Identity facts gathered for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostIdentity {
    /// `None` when the hostname lookup failed.
    pub hostname: Option<String>,
    pub addresses: Vec<NetworkFact>,
}

impl HostIdentity {
    /// Hostname, or empty when unavailable.
    pub fn hostname_or_empty(&self) -> &str {
        self.hostname.as_deref().unwrap_or_default()
    }

    /// Addresses as strings, in collection order.
    pub fn ip_strings(&self) -> Vec<String> {
        self.addresses.iter().map(|f| f.ip.to_string()).collect()
    }
}

/// Collects live identity facts from a `HostProbe`.
#[derive(Clone)]
pub struct IdentityCollector {
    probe: Arc<dyn HostProbe>,
}

impl IdentityCollector {
    pub fn new(probe: impl HostProbe) -> Self {
        Self {
            probe: Arc::new(probe),
        }
    }

    /// Collector reading the real OS state.
    pub fn system() -> Self {
        Self::new(SystemProbe)
    }

    /// Host name, or `None` if the OS lookup failed.
    pub fn hostname(&self) -> Option<String> {
        match self.probe.hostname() {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::debug!(error = %e, "Hostname lookup failed");
                None
            }
        }
    }

    /// Every address on every interface, flattened in enumeration order.
    ///
    /// Not sorted and not deduplicated. Interfaces whose addresses cannot
    /// be listed are skipped.
    pub fn local_addresses(&self) -> Vec<NetworkFact> {
        let interfaces = match self.probe.interfaces() {
            Ok(interfaces) => interfaces,
            Err(e) => {
                tracing::debug!(error = %e, "Interface enumeration failed");
                return Vec::new();
            }
        };

        let mut facts = Vec::new();
        for record in interfaces {
            match record.addrs {
                Ok(addrs) => {
                    facts.extend(addrs.into_iter().map(|a| NetworkFact::new(&record.name, a)));
                }
                Err(e) => {
                    tracing::debug!(interface = %record.name, error = %e, "Skipping interface");
                }
            }
        }
        facts
    }

    /// Hostname and addresses in one pass.
    pub fn collect(&self) -> HostIdentity {
        HostIdentity {
            hostname: self.hostname(),
            addresses: self.local_addresses(),
        }
    }
}

impl std::fmt::Debug for IdentityCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityCollector").finish_non_exhaustive()
    }
}
