//! Report types for subnets and unique local addresses
//!
//! Reports hold rendered text for every field so they can be printed or
//! serialized without further computation. Counts are decimal strings
//! because IPv6 counts exceed any machine integer.
//!
//! # Examples
//!
//! ```
//! use netcalc_core::subnet::Subnet;
//! use netcalc_core::types::SubnetSummary;
//!
//! let subnet = Subnet::from_cidr("10.0.0.1/30").unwrap();
//! let summary = SubnetSummary::from(&subnet);
//! assert_eq!(summary.network.as_deref(), Some("10.0.0.0"));
//! assert_eq!(summary.address_count, "2");
//! ```

use crate::error::Result;
use crate::mac::MacAddr;
use crate::subnet::{Subnet, SubnetInfo};
use crate::ulua::{NtpTimestamp, Ulua};
use serde::{Deserialize, Serialize};

/// Summary of one subnet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubnetSummary {
    /// "IPv4" or "IPv6"
    pub family: String,

    /// Address and prefix, e.g. `192.168.0.1/24`
    pub cidr: String,

    /// Dotted netmask (IPv4 only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,

    /// Network address (IPv4 only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,

    /// Broadcast address (IPv4 only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broadcast: Option<String>,

    pub first_address: String,

    pub last_address: String,

    /// Host count in decimal
    pub address_count: String,

    /// Whether network and broadcast count as hosts (IPv4 only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inclusive_host_count: Option<bool>,
}

impl SubnetSummary {
    /// Returns true for IPv4 summaries
    pub fn is_ipv4(&self) -> bool {
        self.network.is_some()
    }
}

impl From<&Subnet> for SubnetSummary {
    fn from(subnet: &Subnet) -> Self {
        let ipv4 = |value: String| matches!(subnet, Subnet::V4(_)).then_some(value);

        Self {
            family: subnet.family().to_string(),
            cidr: subnet.cidr_notation(),
            netmask: ipv4(subnet.netmask().to_string()),
            network: ipv4(subnet.network_address().to_string()),
            broadcast: subnet.broadcast_address().map(|a| a.to_string()),
            first_address: subnet.low_address().to_string(),
            last_address: subnet.high_address().to_string(),
            address_count: subnet.address_count().to_string(),
            inclusive_host_count: subnet.inclusive_host_count(),
        }
    }
}

/// Where the timestamp of a generated ULUA came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    /// Network time server
    Ntp,
    /// Local system clock
    LocalClock,
}

/// Report of a generated unique local address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UluaSummary {
    /// Full address in RFC 5952 form
    pub address: String,

    /// `/48` routing prefix
    pub site_prefix: String,

    pub global_id: String,

    pub subnet_id: String,

    pub interface_id: String,

    /// Hardware address the Interface ID was derived from; absent when a
    /// random system identifier was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_address: Option<String>,

    /// NTP timestamp as `seconds.fraction` in hex
    pub timestamp: String,

    pub time_source: TimeSource,
}

impl UluaSummary {
    pub fn new(
        ulua: &Ulua,
        timestamp: NtpTimestamp,
        time_source: TimeSource,
        hardware_address: Option<&MacAddr>,
    ) -> Result<Self> {
        Ok(Self {
            address: ulua.to_string(),
            site_prefix: ulua.site_prefix()?.cidr_notation(),
            global_id: ulua.global_id().to_string(),
            subnet_id: ulua.subnet_id().to_string(),
            interface_id: ulua.interface_id().to_string(),
            hardware_address: hardware_address.map(|mac| mac.to_string()),
            timestamp: timestamp.to_string(),
            time_source,
        })
    }
}

/// Result of testing one address against a subnet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Containment {
    pub address: String,
    pub in_range: bool,
}

/// Results of testing several addresses against one subnet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainmentReport {
    pub subnet: String,
    pub results: Vec<Containment>,
}

impl ContainmentReport {
    pub fn new(subnet: &Subnet) -> Self {
        Self {
            subnet: subnet.cidr_notation(),
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, address: impl Into<String>, in_range: bool) {
        self.results.push(Containment {
            address: address.into(),
            in_range,
        });
    }

    /// Number of addresses inside the subnet
    pub fn in_range_count(&self) -> usize {
        self.results.iter().filter(|c| c.in_range).count()
    }
}

/// A single computed value, such as a mask, a prefix or a host count
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueReport {
    /// What was computed, e.g. `"netmask"`
    pub kind: String,
    /// The input the value was computed from
    pub input: String,
    pub value: String,
}

impl ValueReport {
    pub fn new(kind: &str, input: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.to_string(),
            input: input.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_summary() {
        let subnet = Subnet::from_cidr("192.168.15.7/29").unwrap();
        let summary = SubnetSummary::from(&subnet);

        assert!(summary.is_ipv4());
        assert_eq!(summary.family, "IPv4");
        assert_eq!(summary.cidr, "192.168.15.7/29");
        assert_eq!(summary.netmask.as_deref(), Some("255.255.255.248"));
        assert_eq!(summary.network.as_deref(), Some("192.168.15.0"));
        assert_eq!(summary.broadcast.as_deref(), Some("192.168.15.7"));
        assert_eq!(summary.first_address, "192.168.15.1");
        assert_eq!(summary.last_address, "192.168.15.6");
        assert_eq!(summary.address_count, "6");
        assert_eq!(summary.inclusive_host_count, Some(false));
    }

    #[test]
    fn test_ipv6_summary() {
        let subnet = Subnet::from_cidr("2001:db8:3c0d:5b6d::1/58").unwrap();
        let summary = SubnetSummary::from(&subnet);

        assert!(!summary.is_ipv4());
        assert_eq!(summary.family, "IPv6");
        assert_eq!(summary.netmask, None);
        assert_eq!(summary.network, None);
        assert_eq!(summary.broadcast, None);
        assert_eq!(summary.first_address, "2001:db8:3c0d:5b40::");
        assert_eq!(summary.address_count, "1180591620717411303424");
        assert_eq!(summary.inclusive_host_count, None);
    }

    #[test]
    fn test_ipv6_summary_json_omits_ipv4_fields() {
        let subnet = Subnet::from_cidr("fd00::/8").unwrap();
        let json = serde_json::to_string(&SubnetSummary::from(&subnet)).unwrap();
        assert!(!json.contains("netmask"));
        assert!(!json.contains("broadcast"));
        assert!(json.contains("\"first_address\":\"fd00::\""));
    }

    #[test]
    fn test_summary_deserialization() {
        let subnet = Subnet::from_cidr("10.0.0.0/8")
            .unwrap()
            .with_inclusive_host_count(true);
        let summary = SubnetSummary::from(&subnet);
        let json = serde_json::to_string(&summary).unwrap();
        let back: SubnetSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
        assert_eq!(back.address_count, "16777216");
    }

    #[test]
    fn test_ulua_summary() {
        let mac = MacAddr::new([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]);
        let timestamp = NtpTimestamp::new(3_900_000_000, 0x8000_0000);
        let ulua = Ulua::from_hardware_address(&mac, timestamp).unwrap();

        let summary = UluaSummary::new(&ulua, timestamp, TimeSource::Ntp, Some(&mac)).unwrap();
        assert_eq!(summary.address, "fd9e:2c6b:9f1c:0:21b:63ff:fe84:45e6");
        assert_eq!(summary.site_prefix, "fd9e:2c6b:9f1c::/48");
        assert_eq!(summary.global_id, "fd9e2c6b9f1c");
        assert_eq!(summary.subnet_id, "0000");
        assert_eq!(summary.interface_id, "021b:63ff:fe84:45e6");
        assert_eq!(summary.hardware_address.as_deref(), Some("00-1B-63-84-45-E6"));
        assert_eq!(summary.timestamp, "e8754700.80000000");
    }

    #[test]
    fn test_time_source_serialization() {
        assert_eq!(
            serde_json::to_string(&TimeSource::LocalClock).unwrap(),
            "\"local_clock\""
        );
        assert_eq!(serde_json::to_string(&TimeSource::Ntp).unwrap(), "\"ntp\"");
    }

    #[test]
    fn test_containment_report() {
        let subnet = Subnet::from_cidr("192.168.1.0/24").unwrap();
        let mut report = ContainmentReport::new(&subnet);
        report.push("192.168.1.10", true);
        report.push("10.0.0.1", false);

        assert_eq!(report.subnet, "192.168.1.0/24");
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.in_range_count(), 1);
    }

    #[test]
    fn test_value_report() {
        let report = ValueReport::new("netmask", "24", "255.255.255.0");
        assert_eq!(report.kind, "netmask");
        assert_eq!(report.value, "255.255.255.0");
    }
}
