//! Source-interface selection for the Art-Net socket
//!
//! Installations commonly have several NICs (house network, lighting
//! network, Wi-Fi) and a naively unbound socket can route Art-Net over the
//! wrong one, producing unreachable-host errors. Selection runs once at
//! setup (and again only on explicit rebind), in priority order:
//!
//! 1. an explicitly configured local IP, if a usable interface carries it
//! 2. the first interface whose name contains a configured substring
//!    (case-insensitive)
//! 3. with auto-select enabled, the first interface on the destination's
//!    subnet
//! 4. the first private-range address (10/8, 172.16/12, 192.168/16)
//! 5. none: leave the socket unbound and let the OS routing table decide
//!
//! The decision itself is a pure function over [`NicCandidate`]s so it can
//! be tested without touching the host configuration.
//!
//! Loopback and tunnel interfaces are never selected.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Operator preferences for source-interface selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NicPreferences {
    /// Bind exactly this local IP if an interface carries it
    pub local_ip: Option<Ipv4Addr>,
    /// Prefer the first interface whose name contains this substring
    pub name_contains: Option<String>,
    /// Fall through to matching the destination's subnet
    pub auto_subnet_match: bool,
}

/// One local IPv4 interface address as seen by the selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NicCandidate {
    /// Interface name as reported by the OS
    pub name: String,
    /// IPv4 address of the interface
    pub ip: Ipv4Addr,
    /// Subnet mask of the interface
    pub netmask: Ipv4Addr,
    /// True for loopback interfaces
    pub loopback: bool,
}

impl NicCandidate {
    fn is_tunnel(&self) -> bool {
        let name = self.name.to_lowercase();
        ["tun", "tap", "utun", "wg"]
            .iter()
            .any(|prefix| name.starts_with(prefix))
    }

    fn usable(&self) -> bool {
        !self.loopback && !self.is_tunnel()
    }

    fn same_subnet_as(&self, dest: Ipv4Addr) -> bool {
        let mask = u32::from(self.netmask);
        u32::from(self.ip) & mask == u32::from(dest) & mask
    }
}

/// Pick a source address for the given destination, or `None` to leave the
/// socket unbound.
pub fn select_source_ip(
    candidates: &[NicCandidate],
    prefs: &NicPreferences,
    dest: Ipv4Addr,
) -> Option<Ipv4Addr> {
    // 1. Explicit local IP, honored only if a usable interface carries it
    if let Some(wanted) = prefs.local_ip {
        if candidates.iter().any(|c| c.usable() && c.ip == wanted) {
            debug!(%wanted, "using explicitly configured source address");
            return Some(wanted);
        }
        warn!(%wanted, "configured local IP not found on a usable interface");
    }

    // 2. Name substring match
    if let Some(fragment) = prefs.name_contains.as_deref() {
        let fragment = fragment.to_lowercase();
        if let Some(c) = candidates
            .iter()
            .find(|c| c.usable() && c.name.to_lowercase().contains(&fragment))
        {
            debug!(name = %c.name, ip = %c.ip, "selected interface by name");
            return Some(c.ip);
        }
    }

    // 3. Subnet match against the destination
    if prefs.auto_subnet_match {
        if let Some(c) = candidates
            .iter()
            .find(|c| c.usable() && c.same_subnet_as(dest))
        {
            debug!(name = %c.name, ip = %c.ip, "selected interface on destination subnet");
            return Some(c.ip);
        }
    }

    // 4. Any private-range address
    if let Some(c) = candidates.iter().find(|c| c.usable() && c.ip.is_private()) {
        debug!(name = %c.name, ip = %c.ip, "falling back to first private address");
        return Some(c.ip);
    }

    None
}

/// Gather the host's IPv4 interface addresses. Enumeration failure is a
/// degraded mode, not an error: an empty candidate list leaves the socket
/// unbound.
pub fn local_candidates() -> Vec<NicCandidate> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces
            .into_iter()
            .filter_map(|iface| {
                let loopback = iface.is_loopback();
                match iface.addr {
                    if_addrs::IfAddr::V4(v4) => Some(NicCandidate {
                        name: iface.name,
                        ip: v4.ip,
                        netmask: v4.netmask,
                        loopback,
                    }),
                    if_addrs::IfAddr::V6(_) => None,
                }
            })
            .collect(),
        Err(e) => {
            warn!("failed to enumerate network interfaces: {e}");
            Vec::new()
        }
    }
}

/// Resolve the bind address for a destination, logging when selection falls
/// through to the OS routing table.
pub fn resolve_bind_ip(prefs: &NicPreferences, dest: IpAddr) -> Option<Ipv4Addr> {
    let IpAddr::V4(dest) = dest else {
        warn!("non-IPv4 Art-Net destination, leaving socket unbound");
        return None;
    };
    let candidates = local_candidates();
    let chosen = select_source_ip(&candidates, prefs, dest);
    if chosen.is_none() {
        warn!(%dest, "no suitable source interface found, leaving socket unbound");
    }
    chosen
}
