//! Plain text output format

use crate::output::common::bracket;
use crate::output::Report;
use crate::types::{ContainmentReport, SubnetSummary, TimeSource, UluaSummary, ValueReport};

impl Report for SubnetSummary {
    /// IPv4:
    ///
    /// ```text
    /// CIDR-Notation:  [192.168.15.7/29] Netmask: [255.255.255.248]
    /// Network:        [192.168.15.0]
    /// Broadcast:      [192.168.15.7]
    /// First Address:  [192.168.15.1]
    /// Last Address:   [192.168.15.6]
    /// # Addresses:    [6]
    /// ```
    ///
    /// IPv6 has only the CIDR, first, last and count lines.
    fn to_text(&self) -> String {
        let mut buf = format!("CIDR-Notation:\t{}", bracket(&self.cidr));

        if self.is_ipv4() {
            let field = |value: &Option<String>| bracket(value.as_deref().unwrap_or_default());
            buf.push_str(&format!(" Netmask: {}\n", field(&self.netmask)));
            buf.push_str(&format!("Network:\t{}\n", field(&self.network)));
            buf.push_str(&format!("Broadcast:\t{}\n", field(&self.broadcast)));
        } else {
            buf.push('\n');
        }

        buf.push_str(&format!("First Address:\t{}\n", bracket(&self.first_address)));
        buf.push_str(&format!("Last Address:\t{}\n", bracket(&self.last_address)));
        buf.push_str(&format!("# Addresses:\t{}\n", bracket(&self.address_count)));
        buf
    }
}

impl Report for UluaSummary {
    fn to_text(&self) -> String {
        let source = match self.time_source {
            TimeSource::Ntp => "ntp",
            TimeSource::LocalClock => "local clock",
        };

        let mut lines = vec![
            format!("Address:\t{}", bracket(&self.address)),
            format!("Site Prefix:\t{}", bracket(&self.site_prefix)),
            format!("Global ID:\t{}", bracket(&self.global_id)),
            format!("Subnet ID:\t{}", bracket(&self.subnet_id)),
            format!("Interface ID:\t{}", bracket(&self.interface_id)),
        ];
        if let Some(mac) = &self.hardware_address {
            lines.push(format!("Hardware:\t{}", bracket(mac)));
        }
        lines.push(format!("Timestamp:\t{} ({})", bracket(&self.timestamp), source));

        lines.iter().map(|line| format!("{}\n", line)).collect()
    }
}

impl Report for ContainmentReport {
    /// One `address: true|false` line per tested address
    fn to_text(&self) -> String {
        self.results
            .iter()
            .map(|c| format!("{}: {}\n", c.address, c.in_range))
            .collect()
    }
}

impl Report for ValueReport {
    fn to_text(&self) -> String {
        format!("{}\n", self.value)
    }
}
