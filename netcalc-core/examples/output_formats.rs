//! Example: Rendering every report in both output formats
//!
//! Prints subnet summaries for one IPv4 and one IPv6 network, a containment
//! report and a unique local address, first as text and then as JSON.

use netcalc_core::args::OutputFormat;
use netcalc_core::mac::MacAddr;
use netcalc_core::output::render;
use netcalc_core::subnet::{Subnet, SubnetInfo};
use netcalc_core::types::{ContainmentReport, SubnetSummary, TimeSource, UluaSummary};
use netcalc_core::ulua::{NtpTimestamp, Ulua};

fn main() -> netcalc_core::Result<()> {
    let v4 = Subnet::from_cidr("192.168.15.7/29")?;
    let v6 = Subnet::from_cidr("2001:db8:3c0d:5b6d:60b9:4d9e:c3a5:56c9/58")?;

    let mut containment = ContainmentReport::new(&v4);
    for probe in ["192.168.15.0", "192.168.15.3", "192.168.15.7"] {
        containment.push(probe, v4.is_in_range_text(probe)?);
    }

    let mac: MacAddr = "00-1B-63-84-45-E6".parse()?;
    let timestamp = NtpTimestamp::now();
    let ulua = Ulua::from_hardware_address(&mac, timestamp)?;
    let ulua_summary = UluaSummary::new(&ulua, timestamp, TimeSource::LocalClock, Some(&mac))?;

    for format in [OutputFormat::Text, OutputFormat::Json] {
        println!("=== {:?} ===", format);
        print!("{}", render(&SubnetSummary::from(&v4), format)?);
        print!("{}", render(&SubnetSummary::from(&v6), format)?);
        print!("{}", render(&containment, format)?);
        print!("{}", render(&ulua_summary, format)?);
        println!();
    }

    Ok(())
}
