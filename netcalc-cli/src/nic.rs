//! Hardware address discovery
//!
//! Picks the first interface that is up, is not a loopback, and has a real
//! hardware address from a non-virtual adapter. The search can be narrowed to
//! an interface name or to the interface owning a local IP address. Hosts
//! without a match get a random system identifier instead.

use netcalc_core::address::Address;
use netcalc_core::mac::MacAddr;
use netcalc_core::ulua::INTERFACE_ID_LENGTH;
use pnet::datalink::{self, NetworkInterface};
use rand::rngs::OsRng;
use rand::RngCore;
use std::net::IpAddr;
use tracing::{debug, info, warn};

/// The parts of an interface that matter for address selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub up: bool,
    pub loopback: bool,
    pub mac: Option<MacAddr>,
    pub ips: Vec<IpAddr>,
}

/// Which interfaces may supply the hardware address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference<'a> {
    Any,
    Name(&'a str),
    /// The interface that has this address assigned
    Address(IpAddr),
}

impl<'a> Preference<'a> {
    pub fn new(name: Option<&'a str>, address: Option<Address>) -> Self {
        match (address, name) {
            (Some(addr), _) => Preference::Address(addr.into()),
            (None, Some(name)) => Preference::Name(name),
            (None, None) => Preference::Any,
        }
    }
}

impl From<&NetworkInterface> for Candidate {
    fn from(iface: &NetworkInterface) -> Self {
        Self {
            name: iface.name.clone(),
            up: iface.is_up(),
            loopback: iface.is_loopback(),
            mac: iface.mac.map(|datalink::MacAddr(a, b, c, d, e, f)| MacAddr::new([a, b, c, d, e, f])),
            ips: iface.ips.iter().map(|net| net.ip()).collect(),
        }
    }
}

impl Candidate {
    fn matches(&self, preference: Preference<'_>) -> bool {
        match preference {
            Preference::Any => true,
            Preference::Name(name) => self.name == name,
            Preference::Address(ip) => self.ips.contains(&ip),
        }
    }

    /// The hardware address, if this interface may supply one
    fn usable_mac(&self) -> Option<MacAddr> {
        if !self.up || self.loopback {
            return None;
        }
        let mac = self.mac.filter(|m| !m.is_zero())?;

        if let Some(vendor) = mac.virtual_machine_vendor() {
            debug!(interface = %self.name, %mac, vendor, "skipping virtual adapter");
            return None;
        }
        Some(mac)
    }
}

/// Chooses a hardware address among the interfaces matching `preference`
pub fn select(candidates: &[Candidate], preference: Preference<'_>) -> Option<(String, MacAddr)> {
    candidates
        .iter()
        .filter(|c| c.matches(preference))
        .find_map(|c| c.usable_mac().map(|mac| (c.name.clone(), mac)))
}

/// Looks up a usable hardware address on this host
pub fn hardware_address(preference: Preference<'_>) -> Option<MacAddr> {
    let candidates: Vec<Candidate> = datalink::interfaces().iter().map(Candidate::from).collect();
    debug!(count = candidates.len(), "enumerated network interfaces");

    match select(&candidates, preference) {
        Some((name, mac)) => {
            info!(interface = %name, %mac, "using hardware address");
            Some(mac)
        }
        None => {
            warn!(
                ?preference,
                "no usable hardware address, using a random system identifier"
            );
            None
        }
    }
}

/// Random system identifier from the OS generator
pub fn random_system_id() -> [u8; INTERFACE_ID_LENGTH] {
    let mut id = [0u8; INTERFACE_ID_LENGTH];
    OsRng.fill_bytes(&mut id);
    id
}
