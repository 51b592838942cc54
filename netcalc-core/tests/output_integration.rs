//! Integration tests for output formatters

use netcalc_core::args::OutputFormat;
use netcalc_core::mac::MacAddr;
use netcalc_core::output::{render, OutputWriter};
use netcalc_core::subnet::Subnet;
use netcalc_core::types::{ContainmentReport, SubnetSummary, TimeSource, UluaSummary, ValueReport};
use netcalc_core::ulua::{NtpTimestamp, Ulua};
use tempfile::tempdir;

fn sample_ulua_summary() -> UluaSummary {
    let mac = MacAddr::new([0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6]);
    let timestamp = NtpTimestamp::new(3_900_000_000, 0x8000_0000);
    let ulua = Ulua::from_hardware_address(&mac, timestamp).unwrap();
    UluaSummary::new(&ulua, timestamp, TimeSource::Ntp, Some(&mac)).unwrap()
}

#[test]
fn test_subnet_summary_formats() {
    let subnet = Subnet::from_cidr("192.168.0.1/16").unwrap();
    let summary = SubnetSummary::from(&subnet);

    let text = render(&summary, OutputFormat::Text).unwrap();
    assert_eq!(text.lines().count(), 6);
    assert!(text.contains("Broadcast:\t[192.168.255.255]\n"));
    assert!(text.contains("# Addresses:\t[65534]\n"));

    let json = render(&summary, OutputFormat::Json).unwrap();
    let back: SubnetSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back, summary);
}

#[test]
fn test_ulua_summary_formats() {
    let summary = sample_ulua_summary();

    let text = render(&summary, OutputFormat::Text).unwrap();
    assert!(text.contains("Global ID:\t[fd9e2c6b9f1c]\n"));
    assert!(text.contains("Interface ID:\t[021b:63ff:fe84:45e6]\n"));

    let json: serde_json::Value =
        serde_json::from_str(&render(&summary, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["address"], "fd9e:2c6b:9f1c:0:21b:63ff:fe84:45e6");
    assert_eq!(json["time_source"], "ntp");
    assert_eq!(json["hardware_address"], "00-1B-63-84-45-E6");
}

#[test]
fn test_containment_json() {
    let subnet = Subnet::from_cidr("2001:db8::/32").unwrap();
    let mut report = ContainmentReport::new(&subnet);
    report.push("2001:db8::1", true);
    report.push("2001:db9::1", false);

    let json: serde_json::Value =
        serde_json::from_str(&render(&report, OutputFormat::Json).unwrap()).unwrap();
    assert_eq!(json["subnet"], "2001:db8::/32");
    assert_eq!(json["results"][0]["in_range"], true);
    assert_eq!(json["results"][1]["address"], "2001:db9::1");
}

#[test]
fn test_reports_written_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("netcalc.out");

    let mut writer = OutputWriter::open(Some(&path)).unwrap();
    let mask = ValueReport::new("netmask", "24", "255.255.255.0");
    writer
        .write_line(&render(&mask, OutputFormat::Text).unwrap())
        .unwrap();
    writer
        .write_line(&render(&sample_ulua_summary(), OutputFormat::Json).unwrap())
        .unwrap();
    drop(writer);

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("255.255.255.0\n{"));
    assert!(content.ends_with("}\n"));
}
