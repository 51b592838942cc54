//! Fixed-size network addresses and their textual parsers
//!
//! An [`Address`] is an immutable big-endian byte sequence, 4 bytes for IPv4
//! and 16 bytes for IPv6. Parsing accepts:
//! - Dotted-decimal IPv4 (e.g., `192.168.0.1`)
//! - Colon-hex IPv6 with at most one `::` run (e.g., `2001:db8::2:0:0:9abc`)
//! - A trailing `%zone` suffix on IPv6, which is ignored (e.g., `fe80::1%eth0`)
//! - An embedded dotted quad as the final IPv6 component (e.g., `::ffff:192.168.0.1`)
//!
//! # Example
//!
//! ```
//! use netcalc_core::address::{Address, Family};
//!
//! let addr: Address = "::ffff:192.168.0.1".parse().unwrap();
//! assert_eq!(addr.family(), Family::V6);
//! assert_eq!(addr.to_string(), "::ffff:c0a8:1");
//! ```

use crate::error::{Error, Result};
use crate::format;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Number of bytes in an IPv4 address
pub const IPV4_LENGTH: usize = 4;
/// Number of bytes in an IPv6 address
pub const IPV6_LENGTH: usize = 16;

const IPV6_GROUPS: usize = 8;

/// Address family with its bit and byte widths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Family {
    /// 32-bit addresses
    V4,
    /// 128-bit addresses
    V6,
}

impl Family {
    /// Number of bits in an address of this family
    pub const fn bits(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    /// Number of bytes in an address of this family
    pub const fn byte_len(self) -> usize {
        match self {
            Family::V4 => IPV4_LENGTH,
            Family::V6 => IPV6_LENGTH,
        }
    }

    /// Checks a prefix length against `[0, bits]`
    pub fn check_prefix(self, prefix: u32) -> Result<u8> {
        if prefix > u32::from(self.bits()) {
            return Err(Error::OutOfRange(format!(
                "prefix [{}] not in range [0, {}]",
                prefix,
                self.bits()
            )));
        }
        Ok(prefix as u8)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => f.write_str("IPv4"),
            Family::V6 => f.write_str("IPv6"),
        }
    }
}

/// An IPv4 or IPv6 address in network byte order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Address {
    /// 4-byte IPv4 address
    V4([u8; IPV4_LENGTH]),
    /// 16-byte IPv6 address
    V6([u8; IPV6_LENGTH]),
}

impl Address {
    /// Builds an address from raw bytes, choosing the family by length
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if let Ok(v4) = <[u8; IPV4_LENGTH]>::try_from(bytes) {
            return Ok(Address::V4(v4));
        }
        if let Ok(v6) = <[u8; IPV6_LENGTH]>::try_from(bytes) {
            return Ok(Address::V6(v6));
        }
        let nearest = if bytes.len() < IPV4_LENGTH {
            Family::V4
        } else {
            Family::V6
        };
        Err(Error::length("IP address", nearest.byte_len(), bytes.len()))
    }

    /// Returns the address family
    pub fn family(&self) -> Family {
        match self {
            Address::V4(_) => Family::V4,
            Address::V6(_) => Family::V6,
        }
    }

    /// Returns the address bytes in network order
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Address::V4(b) => b,
            Address::V6(b) => b,
        }
    }
}

/// Parses a dotted-decimal IPv4 address
///
/// Exactly four decimal components in `[0, 255]` are required. Anything else,
/// including empty components and signs, is rejected rather than truncated.
///
/// # Examples
///
/// ```
/// use netcalc_core::address::parse_ipv4;
///
/// assert_eq!(parse_ipv4("192.168.0.1").unwrap(), [192, 168, 0, 1]);
/// assert!(parse_ipv4("192.168.0.256").is_err());
/// assert!(parse_ipv4("192.168.0").is_err());
/// ```
pub fn parse_ipv4(text: &str) -> Result<[u8; IPV4_LENGTH]> {
    let invalid = || Error::InvalidFormat(format!("[{}]: invalid IPv4 address", text));

    let mut octets = [0u8; IPV4_LENGTH];
    let mut parts = text.split('.');
    for octet in octets.iter_mut() {
        let part = parts.next().ok_or_else(invalid)?;
        *octet = parse_octet(part).ok_or_else(invalid)?;
    }
    if parts.next().is_some() {
        return Err(invalid());
    }

    Ok(octets)
}

/// Decimal octet; leading zeros are allowed and do not make it octal
fn parse_octet(part: &str) -> Option<u8> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = part.trim_start_matches('0');
    if digits.len() > 3 {
        return None;
    }
    match digits {
        "" => Some(0),
        _ => digits.parse::<u16>().ok().and_then(|v| u8::try_from(v).ok()),
    }
}

fn parse_group(part: &str) -> Option<u16> {
    if part.is_empty() || part.len() > 4 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(part, 16).ok()
}

/// Appends the 16-bit groups of one side of a `::` split.
///
/// A dotted quad is accepted only as the final component of the address and
/// contributes two groups.
fn push_groups(part: &str, quad_allowed: bool, groups: &mut Vec<u16>) -> Option<()> {
    if part.is_empty() {
        return Some(());
    }

    let mut pieces = part.split(':').peekable();
    while let Some(piece) = pieces.next() {
        let is_last = pieces.peek().is_none();
        if is_last && quad_allowed && piece.contains('.') {
            let quad = parse_ipv4(piece).ok()?;
            groups.push(u16::from_be_bytes([quad[0], quad[1]]));
            groups.push(u16::from_be_bytes([quad[2], quad[3]]));
        } else {
            groups.push(parse_group(piece)?);
        }
    }

    Some(())
}

/// Parses a colon-hex IPv6 address
///
/// Supports one `::` zero-compression run, a trailing `%zone` (ignored), and a
/// dotted-quad final component such as `::ffff:192.168.0.1`.
///
/// # Examples
///
/// ```
/// use netcalc_core::address::parse_ipv6;
///
/// let bytes = parse_ipv6("fe80::1%eth0").unwrap();
/// assert_eq!(bytes[0], 0xfe);
/// assert_eq!(bytes[15], 1);
/// assert!(parse_ipv6("2001:db8::2::9abc").is_err());
/// ```
pub fn parse_ipv6(text: &str) -> Result<[u8; IPV6_LENGTH]> {
    let invalid = || Error::InvalidFormat(format!("[{}]: invalid IPv6 address", text));

    let body = match text.split_once('%') {
        Some((body, _zone)) => body,
        None => text,
    };
    if body.is_empty() {
        return Err(invalid());
    }

    let (head, tail) = match body.split_once("::") {
        Some((_, tail)) if tail.contains("::") => return Err(invalid()),
        Some((head, tail)) => (head, Some(tail)),
        None => (body, None),
    };

    let mut head_groups = Vec::with_capacity(IPV6_GROUPS);
    push_groups(head, tail.is_none(), &mut head_groups).ok_or_else(invalid)?;

    let mut tail_groups = Vec::with_capacity(IPV6_GROUPS);
    if let Some(tail) = tail {
        push_groups(tail, true, &mut tail_groups).ok_or_else(invalid)?;
        // "::" stands for at least one group of zeros
        if head_groups.len() + tail_groups.len() >= IPV6_GROUPS {
            return Err(invalid());
        }
    } else if head_groups.len() != IPV6_GROUPS {
        return Err(invalid());
    }

    let mut groups = [0u16; IPV6_GROUPS];
    groups[..head_groups.len()].copy_from_slice(&head_groups);
    groups[IPV6_GROUPS - tail_groups.len()..].copy_from_slice(&tail_groups);

    let mut bytes = [0u8; IPV6_LENGTH];
    for (chunk, group) in bytes.chunks_exact_mut(2).zip(groups) {
        chunk.copy_from_slice(&group.to_be_bytes());
    }

    Ok(bytes)
}

/// Parses either address family, choosing the parser from the delimiters
///
/// A dot before any colon is an error, since an IPv4 address cannot be
/// followed by colon groups (e.g., `192.168.0.1:ffff:1`).
///
/// # Examples
///
/// ```
/// use netcalc_core::address::{parse, Address};
///
/// assert_eq!(parse("192.168.0.1").unwrap(), Address::V4([192, 168, 0, 1]));
/// assert!(parse("192.168.0.1:ffff:1").is_err());
/// assert!(parse("ffff19216801").is_err());
/// ```
pub fn parse(text: &str) -> Result<Address> {
    match (text.find('.'), text.find(':')) {
        (None, None) => Err(Error::InvalidFormat(format!(
            "[{}]: invalid IP address",
            text
        ))),
        (Some(_), None) => parse_ipv4(text).map(Address::V4),
        (Some(dot), Some(colon)) if dot < colon => Err(Error::InvalidFormat(format!(
            "[{}]: dots must not appear before colons",
            text
        ))),
        _ => parse_ipv6(text).map(Address::V6),
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::V4(b) => write!(f, "{}.{}.{}.{}", b[0], b[1], b[2], b[3]),
            Address::V6(b) => f.write_str(&format::to_text(b)),
        }
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Address::V4(ip.octets())
    }
}

impl From<Ipv6Addr> for Address {
    fn from(ip: Ipv6Addr) -> Self {
        Address::V6(ip.octets())
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl From<Address> for IpAddr {
    fn from(addr: Address) -> Self {
        match addr {
            Address::V4(b) => IpAddr::V4(Ipv4Addr::from(b)),
            Address::V6(b) => IpAddr::V6(Ipv6Addr::from(b)),
        }
    }
}
