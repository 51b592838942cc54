//! 48-bit hardware addresses
//!
//! Parses and prints MAC addresses and recognises the organisationally
//! unique identifiers assigned to common hypervisors, whose interfaces do
//! not carry a globally unique hardware address.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Length of a MAC address in bytes
pub const MAC_LENGTH: usize = 6;

/// OUIs of virtual network adapters
const VIRTUAL_MACHINE_OUIS: [([u8; 3], &str); 9] = [
    ([0x00, 0x05, 0x69], "VMware"),
    ([0x00, 0x1C, 0x14], "VMware"),
    ([0x00, 0x0C, 0x29], "VMware"),
    ([0x00, 0x50, 0x56], "VMware"),
    ([0x08, 0x00, 0x27], "VirtualBox"),
    ([0x0A, 0x00, 0x27], "VirtualBox"),
    ([0x00, 0x03, 0xFF], "Virtual-PC"),
    ([0x00, 0x15, 0x5D], "Hyper-V"),
    ([0x00, 0xFF, 0x69], "TAP-Windows"),
];

/// A MAC address
///
/// Displays as six uppercase hex pairs joined by hyphens, e.g.
/// `00-1B-63-84-45-E6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; MAC_LENGTH]);

impl MacAddr {
    /// Creates a MAC address from its six bytes
    pub const fn new(bytes: [u8; MAC_LENGTH]) -> Self {
        MacAddr(bytes)
    }

    pub fn octets(&self) -> [u8; MAC_LENGTH] {
        self.0
    }

    /// The organisationally unique identifier (first three bytes)
    pub fn oui(&self) -> [u8; 3] {
        [self.0[0], self.0[1], self.0[2]]
    }

    /// All-zero addresses are reported by interfaces without hardware
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Name of the hypervisor that owns this address's OUI, if any
    pub fn virtual_machine_vendor(&self) -> Option<&'static str> {
        let oui = self.oui();
        VIRTUAL_MACHINE_OUIS
            .iter()
            .find(|(prefix, _)| *prefix == oui)
            .map(|(_, vendor)| *vendor)
    }

    /// Returns `true` if the OUI belongs to a known virtual adapter
    pub fn is_virtual_machine(&self) -> bool {
        self.virtual_machine_vendor().is_some()
    }
}

impl From<[u8; MAC_LENGTH]> for MacAddr {
    fn from(bytes: [u8; MAC_LENGTH]) -> Self {
        MacAddr(bytes)
    }
}

impl TryFrom<&[u8]> for MacAddr {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; MAC_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::length("MAC address", MAC_LENGTH, bytes.len()))?;
        Ok(MacAddr(bytes))
    }
}

impl FromStr for MacAddr {
    type Err = Error;

    /// Accepts `-` or `:` separators and hex digits of either case
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidFormat(format!("[{}] is not a MAC address", s));

        let separator = if s.contains('-') { '-' } else { ':' };
        let parts: Vec<&str> = s.split(separator).collect();
        if parts.len() != MAC_LENGTH {
            return Err(invalid());
        }

        let mut bytes = [0u8; MAC_LENGTH];
        for (byte, part) in bytes.iter_mut().zip(parts) {
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        Ok(MacAddr(bytes))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(
            f,
            "{:02X}-{:02X}-{:02X}-{:02X}-{:02X}-{:02X}",
            a, b, c, d, e, g
        )
    }
}

impl Serialize for MacAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
