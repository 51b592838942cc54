//! Subnet arithmetic for IPv4 and IPv6
//!
//! This module converts between CIDR prefixes and netmasks and derives the
//! network, broadcast, first/last host and host count of a subnet. It also
//! tests whether an address falls inside a subnet's host range.
//!
//! IPv4 follows the usable-host convention: unless the inclusive host count
//! is requested, the network and broadcast addresses are not hosts. IPv6 has
//! no broadcast address and every address in the prefix counts.
//!
//! # Example
//!
//! ```
//! use netcalc_core::subnet::{Subnet, SubnetInfo};
//!
//! let subnet = Subnet::from_cidr("192.168.15.7/29").unwrap();
//! assert_eq!(subnet.network_address().to_string(), "192.168.15.0");
//! assert_eq!(subnet.low_address().to_string(), "192.168.15.1");
//! assert_eq!(subnet.high_address().to_string(), "192.168.15.6");
//! assert_eq!(subnet.address_count().to_string(), "6");
//! ```

use crate::address::{self, Address, Family, IPV6_LENGTH};
use crate::error::{Error, Result};
use num_bigint::BigUint;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Creates the netmask for a prefix length
///
/// The mask is `prefix` one-bits followed by zero-bits, `family.bits()` wide.
///
/// # Examples
///
/// ```
/// use netcalc_core::address::Family;
/// use netcalc_core::subnet::mask_from_prefix;
///
/// assert_eq!(mask_from_prefix(20, Family::V4).unwrap().to_string(), "255.255.240.0");
/// assert_eq!(mask_from_prefix(0, Family::V4).unwrap().to_string(), "0.0.0.0");
/// assert_eq!(mask_from_prefix(33, Family::V4).is_err(), true);
/// ```
pub fn mask_from_prefix(prefix: u8, family: Family) -> Result<Address> {
    let prefix = family.check_prefix(u32::from(prefix))?;
    Ok(match family {
        Family::V4 => Address::V4(ipv4_mask(prefix).to_be_bytes()),
        Family::V6 => Address::V6(ipv6_mask(prefix)),
    })
}

fn ipv4_mask(prefix: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0)
}

/// Mask for the network bits of one byte, `bits` in `[0, 8]`
fn byte_mask(bits: u32) -> u8 {
    0xffu8.checked_shl(8 - bits).unwrap_or(0)
}

fn ipv6_mask(prefix: u8) -> [u8; IPV6_LENGTH] {
    let mut mask = [0u8; IPV6_LENGTH];
    for (i, byte) in mask.iter_mut().enumerate() {
        let bits = usize::from(prefix).saturating_sub(i * 8).min(8);
        *byte = byte_mask(bits as u32);
    }
    mask
}

/// Converts an IPv4 netmask to its prefix length
///
/// A valid mask is a contiguous run of ones followed by zeros, which holds
/// exactly when the lowest set bit minus one equals the bitwise complement
/// of the mask (Hacker's Delight, section 2.1). IPv6 has no dotted-mask
/// notation and is always rejected.
pub fn prefix_from_mask(mask: &Address) -> Result<u8> {
    match mask {
        Address::V4(bytes) => {
            let m = u32::from_be_bytes(*bytes);
            let lowest_one_bit = m & m.wrapping_neg();
            if lowest_one_bit.wrapping_sub(1) != !m {
                return Err(Error::InvalidMask(format!(
                    "[{}] is not a contiguous netmask",
                    mask
                )));
            }
            Ok(m.count_ones() as u8)
        }
        Address::V6(_) => Err(Error::InvalidMask(format!(
            "[{}]: netmask notation is only defined for IPv4",
            mask
        ))),
    }
}

/// Converts a dotted-decimal netmask such as `255.255.0.0` to a prefix length
///
/// # Examples
///
/// ```
/// use netcalc_core::subnet::mask_text_to_prefix;
///
/// assert_eq!(mask_text_to_prefix("255.255.255.0").unwrap(), 24);
/// assert!(mask_text_to_prefix("255.0.255.0").is_err());
/// ```
pub fn mask_text_to_prefix(mask: &str) -> Result<u8> {
    prefix_from_mask(&Address::V4(address::parse_ipv4(mask)?))
}

/// Converts an IPv4 prefix length to a dotted-decimal netmask
pub fn prefix_to_mask_text(prefix: u8) -> Result<String> {
    Ok(mask_from_prefix(prefix, Family::V4)?.to_string())
}

/// Counts the hosts of a prefix
///
/// For IPv4 without `inclusive`, the network and broadcast addresses are
/// subtracted, and /31 and /32 have no usable host. IPv6 never reserves
/// addresses, so `inclusive` has no effect there.
///
/// # Examples
///
/// ```
/// use netcalc_core::address::Family;
/// use netcalc_core::subnet::host_count;
///
/// assert_eq!(host_count(24, Family::V4, false).unwrap().to_string(), "254");
/// assert_eq!(host_count(31, Family::V4, false).unwrap().to_string(), "0");
/// assert_eq!(host_count(64, Family::V6, false).unwrap().to_string(), "18446744073709551616");
/// ```
pub fn host_count(prefix: u8, family: Family, inclusive: bool) -> Result<BigUint> {
    let prefix = family.check_prefix(u32::from(prefix))?;
    let bits = family.bits();
    let total = BigUint::from(1u8) << usize::from(bits - prefix);

    Ok(match family {
        Family::V6 => total,
        Family::V4 if inclusive => total,
        Family::V4 if prefix < bits - 1 => total - 2u32,
        Family::V4 => BigUint::default(),
    })
}

fn ipv4_host_count(prefix: u8, inclusive: bool) -> u64 {
    let total = 1u64 << (32 - u32::from(prefix));
    if inclusive {
        total
    } else if prefix < 31 {
        total - 2
    } else {
        0
    }
}

/// Parses the numeric part of CIDR notation
fn parse_prefix(text: &str, family: Family) -> Result<u8> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidFormat(format!(
            "[{}] is not a prefix length",
            text
        )));
    }
    // Digits too long for u32 are certainly out of range
    let value = text.parse::<u32>().unwrap_or(u32::MAX);
    family.check_prefix(value)
}

/// Queries shared by IPv4 and IPv6 subnets
pub trait SubnetInfo {
    /// The address the subnet was built from
    fn address(&self) -> Address;

    /// The CIDR prefix length
    fn prefix(&self) -> u8;

    /// The netmask of the prefix
    fn netmask(&self) -> Address;

    /// The address with every host bit cleared
    fn network_address(&self) -> Address;

    /// The address with every host bit set; `None` for IPv6
    fn broadcast_address(&self) -> Option<Address>;

    /// The first host address
    fn low_address(&self) -> Address;

    /// The last host address
    fn high_address(&self) -> Address;

    /// The number of host addresses
    fn address_count(&self) -> BigUint;

    /// Returns `true` if `address` lies in the host range of this subnet
    fn is_in_range(&self, address: &Address) -> bool;

    /// The address followed by a slash and the prefix, e.g. `192.168.0.1/24`
    fn cidr_notation(&self) -> String {
        format!("{}/{}", self.address(), self.prefix())
    }

    /// Parses `text` and tests it with [`SubnetInfo::is_in_range`]
    ///
    /// An address of the other family is an error rather than `false`.
    fn is_in_range_text(&self, text: &str) -> Result<bool> {
        let addr = address::parse(text)?;
        let family = self.address().family();
        if addr.family() != family {
            return Err(Error::FamilyMismatch {
                address: text.to_string(),
                family,
            });
        }
        Ok(self.is_in_range(&addr))
    }
}

/// An IPv4 subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Subnet {
    address: u32,
    prefix: u8,
    netmask: u32,
    network: u32,
    broadcast: u32,
    inclusive_host_count: bool,
}

impl Ipv4Subnet {
    /// Creates a subnet from an address and a prefix in `[0, 32]`
    pub fn new(address: [u8; 4], prefix: u8) -> Result<Self> {
        let prefix = Family::V4.check_prefix(u32::from(prefix))?;
        let address = u32::from_be_bytes(address);
        let netmask = ipv4_mask(prefix);
        let network = address & netmask;

        Ok(Self {
            address,
            prefix,
            netmask,
            network,
            broadcast: network | !netmask,
            inclusive_host_count: false,
        })
    }

    /// Returns a copy whose host count and range include the network and
    /// broadcast addresses when `inclusive` is `true`
    pub fn with_inclusive_host_count(mut self, inclusive: bool) -> Self {
        self.inclusive_host_count = inclusive;
        self
    }

    /// Whether the network and broadcast addresses count as hosts
    pub fn is_inclusive_host_count(&self) -> bool {
        self.inclusive_host_count
    }

    /// The host count as a plain integer; IPv4 counts never exceed 2^32
    pub fn address_count_u64(&self) -> u64 {
        ipv4_host_count(self.prefix, self.inclusive_host_count)
    }

    fn has_usable_hosts(&self) -> bool {
        self.broadcast - self.network > 1
    }

    // Zero stands for "no usable host" on /31 and /32
    fn low(&self) -> u32 {
        if self.inclusive_host_count {
            self.network
        } else if self.has_usable_hosts() {
            self.network + 1
        } else {
            0
        }
    }

    fn high(&self) -> u32 {
        if self.inclusive_host_count {
            self.broadcast
        } else if self.has_usable_hosts() {
            self.broadcast - 1
        } else {
            0
        }
    }
}

impl SubnetInfo for Ipv4Subnet {
    fn address(&self) -> Address {
        Address::V4(self.address.to_be_bytes())
    }

    fn prefix(&self) -> u8 {
        self.prefix
    }

    fn netmask(&self) -> Address {
        Address::V4(self.netmask.to_be_bytes())
    }

    fn network_address(&self) -> Address {
        Address::V4(self.network.to_be_bytes())
    }

    fn broadcast_address(&self) -> Option<Address> {
        Some(Address::V4(self.broadcast.to_be_bytes()))
    }

    fn low_address(&self) -> Address {
        Address::V4(self.low().to_be_bytes())
    }

    fn high_address(&self) -> Address {
        Address::V4(self.high().to_be_bytes())
    }

    fn address_count(&self) -> BigUint {
        BigUint::from(self.address_count_u64())
    }

    fn is_in_range(&self, address: &Address) -> bool {
        let Address::V4(bytes) = address else {
            return false;
        };
        let addr = u32::from_be_bytes(*bytes);

        if self.inclusive_host_count {
            addr >= self.network && addr <= self.broadcast
        } else {
            addr > self.network && addr < self.broadcast
        }
    }
}

impl fmt::Display for Ipv4Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cidr_notation())
    }
}

/// An IPv6 subnet
///
/// Every address inside the prefix is a host; there is no broadcast address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv6Subnet {
    address: [u8; IPV6_LENGTH],
    prefix: u8,
}

impl Ipv6Subnet {
    /// Creates a subnet from an address and a prefix in `[0, 128]`
    pub fn new(address: [u8; IPV6_LENGTH], prefix: u8) -> Result<Self> {
        let prefix = Family::V6.check_prefix(u32::from(prefix))?;
        Ok(Self { address, prefix })
    }

    fn low(&self) -> [u8; IPV6_LENGTH] {
        let mut low = self.address;
        for (byte, mask) in low.iter_mut().zip(ipv6_mask(self.prefix)) {
            *byte &= mask;
        }
        low
    }

    fn high(&self) -> [u8; IPV6_LENGTH] {
        let mut high = self.address;
        for (byte, mask) in high.iter_mut().zip(ipv6_mask(self.prefix)) {
            *byte |= !mask;
        }
        high
    }
}

impl SubnetInfo for Ipv6Subnet {
    fn address(&self) -> Address {
        Address::V6(self.address)
    }

    fn prefix(&self) -> u8 {
        self.prefix
    }

    fn netmask(&self) -> Address {
        Address::V6(ipv6_mask(self.prefix))
    }

    fn network_address(&self) -> Address {
        Address::V6(self.low())
    }

    fn broadcast_address(&self) -> Option<Address> {
        None
    }

    fn low_address(&self) -> Address {
        Address::V6(self.low())
    }

    fn high_address(&self) -> Address {
        Address::V6(self.high())
    }

    fn address_count(&self) -> BigUint {
        BigUint::from(1u8) << (128 - usize::from(self.prefix))
    }

    fn is_in_range(&self, address: &Address) -> bool {
        let Address::V6(addr) = address else {
            return false;
        };

        // Whole network-prefix bytes must match exactly
        let index = usize::from(self.prefix / 8);
        if addr[..index] != self.address[..index] {
            return false;
        }
        if index == IPV6_LENGTH {
            return true;
        }

        // The boundary byte must lie between the low and high host values
        let host_bits = 0xffu8 >> (self.prefix % 8);
        let low = self.address[index] & !host_bits;
        let high = self.address[index] | host_bits;

        (low..=high).contains(&addr[index])
    }
}

impl fmt::Display for Ipv6Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cidr_notation())
    }
}

/// A subnet of either address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subnet {
    /// IPv4 subnet
    V4(Ipv4Subnet),
    /// IPv6 subnet
    V6(Ipv6Subnet),
}

impl Subnet {
    /// Creates a subnet from a parsed address and a prefix length
    pub fn new(address: Address, prefix: u8) -> Result<Self> {
        match address {
            Address::V4(bytes) => Ipv4Subnet::new(bytes, prefix).map(Subnet::V4),
            Address::V6(bytes) => Ipv6Subnet::new(bytes, prefix).map(Subnet::V6),
        }
    }

    /// Parses CIDR notation of either family
    ///
    /// # Examples
    ///
    /// ```
    /// use netcalc_core::subnet::{Subnet, SubnetInfo};
    ///
    /// let subnet = Subnet::from_cidr("2001:db8::ff00:42:8329/46").unwrap();
    /// assert_eq!(subnet.low_address().to_string(), "2001:db8::");
    /// assert!(Subnet::from_cidr("10.0.0.0/33").is_err());
    /// assert!(Subnet::from_cidr("10.0.0.0").is_err());
    /// ```
    pub fn from_cidr(notation: &str) -> Result<Self> {
        let (addr_text, prefix_text) = notation.split_once('/').ok_or_else(|| {
            Error::InvalidFormat(format!("[{}] is not in CIDR notation", notation))
        })?;

        let address = address::parse(addr_text)?;
        let prefix = parse_prefix(prefix_text, address.family())?;
        debug!(%address, prefix, "parsed CIDR notation");

        Self::new(address, prefix)
    }

    /// Creates an IPv4 subnet from a dotted address and a dotted netmask
    ///
    /// # Examples
    ///
    /// ```
    /// use netcalc_core::subnet::{Subnet, SubnetInfo};
    ///
    /// let subnet = Subnet::from_mask("192.168.0.1", "255.255.0.0").unwrap();
    /// assert_eq!(subnet.cidr_notation(), "192.168.0.1/16");
    /// ```
    pub fn from_mask(address: &str, mask: &str) -> Result<Self> {
        let bytes = address::parse_ipv4(address)?;
        let prefix = mask_text_to_prefix(mask)?;
        debug!(address, mask, prefix, "converted netmask to prefix");

        Ipv4Subnet::new(bytes, prefix).map(Subnet::V4)
    }

    /// Returns a copy with the given inclusive host count setting.
    /// IPv6 subnets are returned unchanged.
    pub fn with_inclusive_host_count(self, inclusive: bool) -> Self {
        match self {
            Subnet::V4(s) => Subnet::V4(s.with_inclusive_host_count(inclusive)),
            Subnet::V6(s) => Subnet::V6(s),
        }
    }

    /// The inclusive host count setting; `None` for IPv6
    pub fn inclusive_host_count(&self) -> Option<bool> {
        match self {
            Subnet::V4(s) => Some(s.is_inclusive_host_count()),
            Subnet::V6(_) => None,
        }
    }

    /// The address family of the subnet
    pub fn family(&self) -> Family {
        match self {
            Subnet::V4(_) => Family::V4,
            Subnet::V6(_) => Family::V6,
        }
    }

    fn info(&self) -> &dyn SubnetInfo {
        match self {
            Subnet::V4(s) => s,
            Subnet::V6(s) => s,
        }
    }
}

impl SubnetInfo for Subnet {
    fn address(&self) -> Address {
        self.info().address()
    }

    fn prefix(&self) -> u8 {
        self.info().prefix()
    }

    fn netmask(&self) -> Address {
        self.info().netmask()
    }

    fn network_address(&self) -> Address {
        self.info().network_address()
    }

    fn broadcast_address(&self) -> Option<Address> {
        self.info().broadcast_address()
    }

    fn low_address(&self) -> Address {
        self.info().low_address()
    }

    fn high_address(&self) -> Address {
        self.info().high_address()
    }

    fn address_count(&self) -> BigUint {
        self.info().address_count()
    }

    fn is_in_range(&self, address: &Address) -> bool {
        self.info().is_in_range(address)
    }
}

impl FromStr for Subnet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Subnet::from_cidr(s)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cidr_notation())
    }
}
