//! Unique Local IPv6 Unicast Addresses (RFC 4193)
//!
//! A ULUA is `Global ID (6 bytes) ‖ Subnet ID (2 bytes) ‖ Interface ID (8 bytes)`.
//! The Global ID is `0xfd` followed by the low 40 bits of
//! `SHA-1(NTP timestamp ‖ system ID)`, per RFC 4193 section 3.2.2. The
//! Interface ID is the modified EUI-64 of a hardware address.
//!
//! Nothing here touches the network or a random source: the caller supplies
//! the timestamp (from an NTP server or the local clock) and either a
//! hardware address or a random system identifier.
//!
//! # Example
//!
//! ```
//! use netcalc_core::mac::MacAddr;
//! use netcalc_core::ulua::{NtpTimestamp, Ulua};
//!
//! let mac: MacAddr = "00-1B-63-84-45-E6".parse().unwrap();
//! let ulua = Ulua::from_hardware_address(&mac, NtpTimestamp::new(3_900_000_000, 0x8000_0000)).unwrap();
//! assert_eq!(ulua.to_string(), "fd9e:2c6b:9f1c:0:21b:63ff:fe84:45e6");
//! ```

use crate::address::{Address, IPV6_LENGTH};
use crate::error::{Error, Result};
use crate::format;
use crate::mac::MacAddr;
use crate::sha1;
use crate::subnet::Ipv6Subnet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Length of the Global ID in bytes, including the `0xfd` prefix
pub const GLOBAL_ID_LENGTH: usize = 6;
/// Length of the Subnet ID in bytes
pub const SUBNET_ID_LENGTH: usize = 2;
/// Length of the Interface ID in bytes
pub const INTERFACE_ID_LENGTH: usize = 8;

/// First byte of every locally assigned unique local address (`fd00::/8`)
pub const ULA_PREFIX: u8 = 0xfd;

/// Prefix length of the routing prefix formed by the Global ID
pub const SITE_PREFIX_LENGTH: u8 = 48;

/// Seconds from the NTP era 0 epoch (1900-01-01) to the Unix epoch
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// A 64-bit NTP timestamp: seconds since 1900-01-01 UTC in the high 32 bits,
/// binary fraction of a second in the low 32 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NtpTimestamp(u64);

impl NtpTimestamp {
    pub const fn new(seconds: u32, fraction: u32) -> Self {
        NtpTimestamp(((seconds as u64) << 32) | fraction as u64)
    }

    pub const fn from_bits(bits: u64) -> Self {
        NtpTimestamp(bits)
    }

    pub const fn to_bits(self) -> u64 {
        self.0
    }

    pub const fn seconds(self) -> u32 {
        (self.0 >> 32) as u32
    }

    pub const fn fraction(self) -> u32 {
        self.0 as u32
    }

    /// Reads the local clock
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    /// Converts back to calendar time, if representable
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let unix_seconds = i64::from(self.seconds()) - NTP_UNIX_OFFSET as i64;
        let nanos = (u64::from(self.fraction()) * NANOS_PER_SECOND) >> 32;
        DateTime::from_timestamp(unix_seconds, nanos as u32)
    }

    fn from_unix(seconds: i64, nanos: u32) -> Self {
        // Era wraps every 2^32 seconds, as on the wire
        let ntp_seconds = (seconds + NTP_UNIX_OFFSET as i64) as u32;
        let fraction = ((u64::from(nanos) << 32) / NANOS_PER_SECOND) as u32;
        NtpTimestamp::new(ntp_seconds, fraction)
    }
}

impl From<SystemTime> for NtpTimestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(since) => Self::from_unix(since.as_secs() as i64, since.subsec_nanos()),
            Err(err) => {
                let before = err.duration();
                let mut seconds = -(before.as_secs() as i64);
                let mut nanos = before.subsec_nanos();
                if nanos > 0 {
                    seconds -= 1;
                    nanos = NANOS_PER_SECOND as u32 - nanos;
                }
                Self::from_unix(seconds, nanos)
            }
        }
    }
}

impl From<DateTime<Utc>> for NtpTimestamp {
    fn from(time: DateTime<Utc>) -> Self {
        Self::from_unix(time.timestamp(), time.timestamp_subsec_nanos())
    }
}

impl fmt::Display for NtpTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}.{:08x}", self.seconds(), self.fraction())
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// The 48-bit Global ID: `0xfd` followed by 40 pseudo-random bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalId([u8; GLOBAL_ID_LENGTH]);

impl GlobalId {
    pub fn as_bytes(&self) -> &[u8; GLOBAL_ID_LENGTH] {
        &self.0
    }
}

impl TryFrom<&[u8]> for GlobalId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; GLOBAL_ID_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::length("Global ID", GLOBAL_ID_LENGTH, bytes.len()))?;
        if bytes[0] != ULA_PREFIX {
            return Err(Error::InvalidPrefix(format!(
                "{} does not start with {:02x}",
                hex(&bytes),
                ULA_PREFIX
            )));
        }
        Ok(GlobalId(bytes))
    }
}

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex(&self.0))
    }
}

/// The 16-bit Subnet ID; zero unless the site assigns one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubnetId([u8; SUBNET_ID_LENGTH]);

impl SubnetId {
    pub fn as_bytes(&self) -> &[u8; SUBNET_ID_LENGTH] {
        &self.0
    }

    pub fn value(&self) -> u16 {
        u16::from_be_bytes(self.0)
    }
}

impl From<u16> for SubnetId {
    fn from(value: u16) -> Self {
        SubnetId(value.to_be_bytes())
    }
}

impl TryFrom<&[u8]> for SubnetId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; SUBNET_ID_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::length("Subnet ID", SUBNET_ID_LENGTH, bytes.len()))?;
        Ok(SubnetId(bytes))
    }
}

impl FromStr for SubnetId {
    type Err = Error;

    /// Parses one to four hex digits, e.g. `2a` or `00ff`
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s.len() > 4 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::InvalidFormat(format!(
                "[{}] is not a 16-bit hex Subnet ID",
                s
            )));
        }
        u16::from_str_radix(s, 16)
            .map(SubnetId::from)
            .map_err(|e| Error::InvalidFormat(format!("[{}]: {}", s, e)))
    }
}

impl fmt::Display for SubnetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}", self.value())
    }
}

/// The 64-bit Interface ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceId([u8; INTERFACE_ID_LENGTH]);

impl InterfaceId {
    pub fn as_bytes(&self) -> &[u8; INTERFACE_ID_LENGTH] {
        &self.0
    }
}

impl From<[u8; INTERFACE_ID_LENGTH]> for InterfaceId {
    fn from(bytes: [u8; INTERFACE_ID_LENGTH]) -> Self {
        InterfaceId(bytes)
    }
}

impl From<&MacAddr> for InterfaceId {
    fn from(mac: &MacAddr) -> Self {
        create_eui64(mac)
    }
}

impl TryFrom<&[u8]> for InterfaceId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; INTERFACE_ID_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::length("Interface ID", INTERFACE_ID_LENGTH, bytes.len()))?;
        Ok(InterfaceId(bytes))
    }
}

impl fmt::Display for InterfaceId {
    /// Four colon-separated groups, e.g. `021b:63ff:fe84:45e6`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let groups: Vec<String> = self.0.chunks_exact(2).map(hex).collect();
        f.write_str(&groups.join(":"))
    }
}

/// Derives the modified EUI-64 Interface ID of a MAC address
///
/// `ff:fe` is inserted between the OUI and the device half, and the
/// universal/local bit of the first byte is inverted (RFC 4291 appendix A).
///
/// # Examples
///
/// ```
/// use netcalc_core::mac::MacAddr;
/// use netcalc_core::ulua::create_eui64;
///
/// let mac = MacAddr::new([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]);
/// assert_eq!(create_eui64(&mac).to_string(), "021b:63ff:fe84:45e6");
/// ```
pub fn create_eui64(mac: &MacAddr) -> InterfaceId {
    let [a, b, c, d, e, f] = mac.octets();
    InterfaceId([a ^ 0x02, b, c, 0xff, 0xfe, d, e, f])
}

/// Derives a Global ID from a timestamp and an 8-byte system identifier
pub fn generate_global_id(
    timestamp: NtpTimestamp,
    system_id: &[u8; INTERFACE_ID_LENGTH],
) -> Result<GlobalId> {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&timestamp.to_bits().to_be_bytes());
    key[8..].copy_from_slice(system_id);

    let low = sha1::low_40_bits(&key)?;

    let mut global_id = [0u8; GLOBAL_ID_LENGTH];
    global_id[0] = ULA_PREFIX;
    global_id[1..].copy_from_slice(&low);

    let global_id = GlobalId(global_id);
    debug!(%timestamp, %global_id, "derived Global ID");
    Ok(global_id)
}

/// Builds the ULUA of a hardware address and renders it as an address
pub fn build_ulua(
    hardware_address: &MacAddr,
    timestamp: NtpTimestamp,
    subnet_id: SubnetId,
) -> Result<Address> {
    Ok(Ulua::from_hardware_address(hardware_address, timestamp)?
        .with_subnet_id(subnet_id)
        .address())
}

/// A Unique Local IPv6 Unicast Address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ulua {
    global_id: GlobalId,
    subnet_id: SubnetId,
    interface_id: InterfaceId,
}

impl Ulua {
    /// Assembles a ULUA from already validated parts
    pub fn from_parts(global_id: GlobalId, subnet_id: SubnetId, interface_id: InterfaceId) -> Self {
        Self {
            global_id,
            subnet_id,
            interface_id,
        }
    }

    /// Builds a ULUA whose Interface ID is the EUI-64 of `mac`
    ///
    /// The Interface ID doubles as the system identifier hashed into the
    /// Global ID.
    pub fn from_hardware_address(mac: &MacAddr, timestamp: NtpTimestamp) -> Result<Self> {
        let interface_id = create_eui64(mac);
        let global_id = generate_global_id(timestamp, interface_id.as_bytes())?;
        Ok(Self::from_parts(global_id, SubnetId::default(), interface_id))
    }

    /// Builds a ULUA for a host without a usable hardware address
    ///
    /// `system_id` (normally random bytes) is hashed into the Global ID and
    /// also serves as the Interface ID.
    pub fn from_system_id(
        system_id: [u8; INTERFACE_ID_LENGTH],
        timestamp: NtpTimestamp,
    ) -> Result<Self> {
        let global_id = generate_global_id(timestamp, &system_id)?;
        Ok(Self::from_parts(
            global_id,
            SubnetId::default(),
            InterfaceId(system_id),
        ))
    }

    pub fn with_subnet_id(mut self, subnet_id: SubnetId) -> Self {
        self.subnet_id = subnet_id;
        self
    }

    pub fn global_id(&self) -> GlobalId {
        self.global_id
    }

    pub fn subnet_id(&self) -> SubnetId {
        self.subnet_id
    }

    pub fn interface_id(&self) -> InterfaceId {
        self.interface_id
    }

    pub fn to_bytes(&self) -> [u8; IPV6_LENGTH] {
        let mut bytes = [0u8; IPV6_LENGTH];
        bytes[..6].copy_from_slice(&self.global_id.0);
        bytes[6..8].copy_from_slice(&self.subnet_id.0);
        bytes[8..].copy_from_slice(&self.interface_id.0);
        bytes
    }

    pub fn address(&self) -> Address {
        Address::V6(self.to_bytes())
    }

    /// The `/48` routing prefix formed by the Global ID
    pub fn site_prefix(&self) -> Result<Ipv6Subnet> {
        let mut bytes = [0u8; IPV6_LENGTH];
        bytes[..GLOBAL_ID_LENGTH].copy_from_slice(&self.global_id.0);
        Ipv6Subnet::new(bytes, SITE_PREFIX_LENGTH)
    }
}

impl fmt::Display for Ulua {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::to_text(&self.to_bytes()))
    }
}
