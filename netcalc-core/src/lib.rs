//! Netcalc Core Library
//!
//! This library provides IPv4/IPv6 subnet arithmetic, canonical IPv6 text
//! formatting (RFC 5952) and Unique Local IPv6 Unicast Address generation
//! (RFC 4193). Everything here is pure computation: timestamps and hardware
//! addresses are supplied by the caller.
//!
//! # Modules
//!
//! - [`address`] - Address parsing and the byte-level address type
//! - [`format`] - RFC 5952 IPv6 text formatting
//! - [`subnet`] - Prefixes, netmasks, host ranges and containment
//! - [`sha1`] - Single-block SHA-1 used for Global ID derivation
//! - [`mac`] - MAC addresses and virtual adapter detection
//! - [`ulua`] - EUI-64 interface IDs and unique local addresses
//! - [`types`] - Serializable reports
//! - [`output`] - Text and JSON renderers
//! - [`args`] - CLI argument parsing and validation
//!
//! # Example
//!
//! ```
//! use netcalc_core::subnet::{Subnet, SubnetInfo};
//!
//! let subnet: Subnet = "2001:db8::ff00:42:8329/46".parse()?;
//! assert_eq!(subnet.low_address().to_string(), "2001:db8::");
//! assert_eq!(subnet.high_address().to_string(), "2001:db8:3:ffff:ffff:ffff:ffff:ffff");
//! assert!(subnet.is_in_range_text("2001:db8:1::1")?);
//! # Ok::<(), netcalc_core::Error>(())
//! ```

pub mod address;
pub mod args;
pub mod error;
pub mod format;
pub mod mac;
pub mod output;
pub mod sha1;
pub mod subnet;
pub mod types;
pub mod ulua;


pub use address::{Address, Family};
pub use error::{Error, Result};
pub use mac::MacAddr;
pub use subnet::{Ipv4Subnet, Ipv6Subnet, Subnet, SubnetInfo};
pub use ulua::{NtpTimestamp, Ulua};
