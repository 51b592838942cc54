//! Subcommand execution
//!
//! Each subcommand builds a report; [`run`] renders it in the requested
//! output format.

use crate::{nic, ntp};
use anyhow::Result;
use netcalc_core::address::{self, Family};
use netcalc_core::args::{CalcArgs, Command, UlaArgs};
use netcalc_core::mac::MacAddr;
use netcalc_core::output::render;
use netcalc_core::subnet::{self, Subnet, SubnetInfo};
use netcalc_core::types::{ContainmentReport, SubnetSummary, TimeSource, UluaSummary, ValueReport};
use netcalc_core::ulua::{self, NtpTimestamp, Ulua};
use tracing::info;

pub fn subnet(target: &str, mask: Option<&str>, inclusive: bool) -> Result<SubnetSummary> {
    let subnet = match mask {
        Some(mask) => Subnet::from_mask(target, mask)?,
        None => Subnet::from_cidr(target)?,
    }
    .with_inclusive_host_count(inclusive);

    Ok(SubnetSummary::from(&subnet))
}

pub fn contains(cidr: &str, addresses: &[String], inclusive: bool) -> Result<ContainmentReport> {
    let subnet = Subnet::from_cidr(cidr)?.with_inclusive_host_count(inclusive);

    let mut report = ContainmentReport::new(&subnet);
    for text in addresses {
        report.push(text.as_str(), subnet.is_in_range_text(text)?);
    }
    Ok(report)
}

pub fn mask(prefix: u32) -> Result<ValueReport> {
    let prefix = Family::V4.check_prefix(prefix)?;
    Ok(ValueReport::new(
        "netmask",
        prefix.to_string(),
        subnet::prefix_to_mask_text(prefix)?,
    ))
}

pub fn prefix(mask: &str) -> Result<ValueReport> {
    let prefix = subnet::mask_text_to_prefix(mask)?;
    Ok(ValueReport::new("prefix", mask, prefix.to_string()))
}

pub fn hosts(prefix: u32, ipv6: bool, inclusive: bool) -> Result<ValueReport> {
    let family = if ipv6 { Family::V6 } else { Family::V4 };
    let prefix = family.check_prefix(prefix)?;
    let count = subnet::host_count(prefix, family, inclusive)?;
    Ok(ValueReport::new("hosts", prefix.to_string(), count.to_string()))
}

pub fn canonical(text: &str) -> Result<ValueReport> {
    let address = address::parse(text)?;
    Ok(ValueReport::new("canonical", text, address.to_string()))
}

pub fn eui64(text: &str) -> Result<ValueReport> {
    let mac: MacAddr = text.parse()?;
    Ok(ValueReport::new(
        "eui64",
        mac.to_string(),
        ulua::create_eui64(&mac).to_string(),
    ))
}

/// Builds a ULUA from an already obtained timestamp
///
/// Without a hardware address, `system_id` supplies the random identifier.
pub fn ula_from(
    args: &UlaArgs,
    timestamp: NtpTimestamp,
    time_source: TimeSource,
    mac: Option<MacAddr>,
    system_id: impl FnOnce() -> [u8; ulua::INTERFACE_ID_LENGTH],
) -> Result<UluaSummary> {
    let ulua = match &mac {
        Some(mac) => Ulua::from_hardware_address(mac, timestamp)?,
        None => Ulua::from_system_id(system_id(), timestamp)?,
    }
    .with_subnet_id(args.subnet_id()?);

    info!(address = %ulua, "generated unique local address");
    Ok(UluaSummary::new(&ulua, timestamp, time_source, mac.as_ref())?)
}

pub async fn ula(args: &UlaArgs) -> Result<UluaSummary> {
    let (timestamp, time_source) = if args.no_ntp {
        (NtpTimestamp::now(), TimeSource::LocalClock)
    } else {
        ntp::timestamp(&args.ntp_server, args.ntp_timeout()).await
    };

    let mac = match args.hardware_address()? {
        Some(mac) => Some(mac),
        None => nic::hardware_address(nic::Preference::new(
            args.interface.as_deref(),
            args.local_address()?,
        )),
    };

    ula_from(args, timestamp, time_source, mac, nic::random_system_id)
}

/// Executes the parsed command and returns the rendered output
pub async fn run(args: &CalcArgs) -> Result<String> {
    let format = args.output_format();

    let rendered = match &args.command {
        Command::Subnet {
            target,
            mask,
            inclusive,
        } => render(&subnet(target, mask.as_deref(), *inclusive)?, format)?,
        Command::Contains {
            cidr,
            addresses,
            inclusive,
        } => render(&contains(cidr, addresses, *inclusive)?, format)?,
        Command::Mask { prefix } => render(&mask(*prefix)?, format)?,
        Command::Prefix { mask } => render(&prefix(mask)?, format)?,
        Command::Hosts {
            prefix,
            ipv6,
            inclusive,
        } => render(&hosts(*prefix, *ipv6, *inclusive)?, format)?,
        Command::Canonical { address } => render(&canonical(address)?, format)?,
        Command::Eui64 { mac } => render(&eui64(mac)?, format)?,
        Command::Ula(ula_args) => render(&ula(ula_args).await?, format)?,
    };

    Ok(rendered)
}
