//! CLI argument parsing and validation
//!
//! This module describes the command line of the `netcalc` tool. Parsing is
//! done by clap; [`CalcArgs::validate`] then checks the values clap cannot
//! judge, such as prefix bounds or MAC address syntax, before any work starts.
//!
//! # Examples
//!
//! ```
//! use netcalc_core::args::{CalcArgs, Command, OutputFormat};
//!
//! let args = CalcArgs::from_iter_safe(["netcalc", "--json", "subnet", "10.0.0.1/8"]).unwrap();
//! assert!(args.validate().is_ok());
//! assert_eq!(args.output_format(), OutputFormat::Json);
//! assert!(matches!(args.command, Command::Subnet { .. }));
//! ```

use crate::address::{self, Address, Family};
use crate::error::{Error, Result};
use crate::mac::MacAddr;
use crate::ulua::SubnetId;
use clap::{ArgAction, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

/// Time server queried for the ULUA timestamp
pub const DEFAULT_NTP_SERVER: &str = "pool.ntp.org";

/// How long to wait for the time server's reply
pub const DEFAULT_NTP_TIMEOUT_MS: u64 = 3000;

/// Parsed command-line arguments
#[derive(Debug, Clone, Parser)]
#[command(name = "netcalc")]
#[command(about = "IPv4/IPv6 subnet calculator and unique local address generator")]
#[command(version)]
pub struct CalcArgs {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Append output to a file instead of stdout
    #[arg(short, long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the summary of a subnet given in CIDR notation, or of an
    /// IPv4 address with --mask
    Subnet {
        /// CIDR notation such as 192.168.0.1/24, or a bare IPv4 address
        target: String,

        /// Dotted netmask for a bare IPv4 address
        #[arg(short, long)]
        mask: Option<String>,

        /// Count network and broadcast addresses as hosts (IPv4)
        #[arg(long)]
        inclusive: bool,
    },

    /// Test whether addresses fall inside a subnet's host range
    Contains {
        /// Subnet in CIDR notation
        cidr: String,

        /// Addresses to test
        #[arg(required = true)]
        addresses: Vec<String>,

        /// Count network and broadcast addresses as hosts (IPv4)
        #[arg(long)]
        inclusive: bool,
    },

    /// Print the dotted IPv4 netmask of a prefix length
    Mask {
        /// Prefix length, 0 to 32
        prefix: u32,
    },

    /// Print the prefix length of a dotted IPv4 netmask
    Prefix {
        /// Netmask such as 255.255.240.0
        mask: String,
    },

    /// Print the number of hosts for a prefix length
    Hosts {
        /// Prefix length
        prefix: u32,

        /// Use the IPv6 address width
        #[arg(long)]
        ipv6: bool,

        /// Count network and broadcast addresses as hosts (IPv4)
        #[arg(long)]
        inclusive: bool,
    },

    /// Print an address in canonical text form
    Canonical {
        /// IPv4 or IPv6 address
        address: String,
    },

    /// Print the modified EUI-64 interface identifier of a MAC address
    Eui64 {
        /// MAC address such as 00-1B-63-84-45-E6
        mac: String,
    },

    /// Generate a unique local IPv6 address (RFC 4193)
    Ula(UlaArgs),
}

/// Options of the `ula` subcommand
#[derive(Debug, Clone, clap::Args)]
pub struct UlaArgs {
    /// Hardware address to derive the Interface ID from (default: discovered)
    #[arg(long)]
    pub mac: Option<String>,

    /// Subnet ID as 1-4 hex digits
    #[arg(long, value_name = "HEX", default_value = "0")]
    pub subnet_id: String,

    /// Use the local clock instead of querying a time server
    #[arg(long)]
    pub no_ntp: bool,

    /// Time server to query
    #[arg(long, env = "NETCALC_NTP_SERVER", default_value = DEFAULT_NTP_SERVER)]
    pub ntp_server: String,

    /// Time server timeout in milliseconds
    #[arg(long, env = "NETCALC_NTP_TIMEOUT_MS", default_value_t = DEFAULT_NTP_TIMEOUT_MS)]
    pub ntp_timeout_ms: u64,

    /// Network interface to take the hardware address from
    #[arg(long, env = "NETCALC_INTERFACE")]
    pub interface: Option<String>,

    /// Take the hardware address from the interface that owns this local IP
    /// (overrides --interface)
    #[arg(long, value_name = "IP")]
    pub address: Option<String>,
}

impl UlaArgs {
    pub fn ntp_timeout(&self) -> Duration {
        Duration::from_millis(self.ntp_timeout_ms)
    }

    pub fn subnet_id(&self) -> Result<SubnetId> {
        self.subnet_id.parse()
    }

    /// The `--mac` value, parsed
    pub fn hardware_address(&self) -> Result<Option<MacAddr>> {
        self.mac.as_deref().map(str::parse).transpose()
    }

    /// The `--address` value, parsed
    pub fn local_address(&self) -> Result<Option<Address>> {
        self.address.as_deref().map(address::parse).transpose()
    }

    fn validate(&self) -> Result<()> {
        if self.ntp_timeout_ms == 0 {
            return Err(Error::OutOfRange(
                "ntp-timeout-ms must be greater than 0".to_string(),
            ));
        }
        if !self.no_ntp && self.ntp_server.trim().is_empty() {
            return Err(Error::InvalidFormat("ntp-server must not be empty".to_string()));
        }
        self.subnet_id()?;
        self.hardware_address()?;
        self.local_address()?;
        Ok(())
    }
}

impl CalcArgs {
    /// Parses arguments from an iterator, the first item being the program name
    ///
    /// # Examples
    ///
    /// ```
    /// use netcalc_core::args::CalcArgs;
    ///
    /// assert!(CalcArgs::from_iter_safe(["netcalc", "mask", "24"]).is_ok());
    /// assert!(CalcArgs::from_iter_safe(["netcalc", "bogus"]).is_err());
    /// ```
    pub fn from_iter_safe<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }

    /// Validates argument values that clap cannot check on its own
    ///
    /// # Examples
    ///
    /// ```
    /// use netcalc_core::args::CalcArgs;
    ///
    /// let args = CalcArgs::from_iter_safe(["netcalc", "mask", "33"]).unwrap();
    /// assert!(args.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Subnet {
                target, mask: Some(_), ..
            } if target.contains('/') => Err(Error::InvalidFormat(format!(
                "[{}]: --mask needs a bare IPv4 address",
                target
            ))),
            Command::Mask { prefix } => Family::V4.check_prefix(*prefix).map(|_| ()),
            Command::Hosts { prefix, ipv6, .. } => {
                let family = if *ipv6 { Family::V6 } else { Family::V4 };
                family.check_prefix(*prefix).map(|_| ())
            }
            Command::Eui64 { mac } => mac.parse::<MacAddr>().map(|_| ()),
            Command::Ula(ula) => ula.validate(),
            _ => Ok(()),
        }
    }

    /// Returns the effective output format based on args
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Maximum log level for the verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Labelled text lines
    #[default]
    Text,

    /// JSON object
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CalcArgs {
        CalcArgs::from_iter_safe(args.iter().copied()).unwrap()
    }

    #[test]
    fn test_subnet_cidr() {
        let args = parse(&["netcalc", "subnet", "192.168.0.1/24"]);
        match args.command {
            Command::Subnet {
                target,
                mask,
                inclusive,
            } => {
                assert_eq!(target, "192.168.0.1/24");
                assert_eq!(mask, None);
                assert!(!inclusive);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_subnet_with_mask() {
        let args = parse(&["netcalc", "subnet", "192.168.0.1", "-m", "255.255.0.0", "--inclusive"]);
        assert!(args.validate().is_ok());
        match args.command {
            Command::Subnet { mask, inclusive, .. } => {
                assert_eq!(mask.as_deref(), Some("255.255.0.0"));
                assert!(inclusive);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_subnet_mask_with_cidr_rejected() {
        let args = parse(&["netcalc", "subnet", "192.168.0.1/16", "--mask", "255.255.0.0"]);
        assert!(matches!(args.validate(), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_contains_requires_address() {
        assert!(CalcArgs::from_iter_safe(["netcalc", "contains", "10.0.0.0/8"]).is_err());

        let args = parse(&["netcalc", "contains", "10.0.0.0/8", "10.1.1.1", "11.0.0.1"]);
        match args.command {
            Command::Contains { addresses, .. } => assert_eq!(addresses.len(), 2),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_mask_prefix_bounds() {
        assert!(parse(&["netcalc", "mask", "32"]).validate().is_ok());
        assert!(matches!(
            parse(&["netcalc", "mask", "33"]).validate(),
            Err(Error::OutOfRange(_))
        ));
        assert!(CalcArgs::from_iter_safe(["netcalc", "mask", "-1"]).is_err());
        assert!(CalcArgs::from_iter_safe(["netcalc", "mask", "abc"]).is_err());
    }

    #[test]
    fn test_hosts_family_bounds() {
        assert!(parse(&["netcalc", "hosts", "64", "--ipv6"]).validate().is_ok());
        assert!(parse(&["netcalc", "hosts", "64"]).validate().is_err());
        assert!(parse(&["netcalc", "hosts", "129", "--ipv6"]).validate().is_err());
    }

    #[test]
    fn test_eui64_mac_validation() {
        assert!(parse(&["netcalc", "eui64", "00-1B-63-84-45-E6"]).validate().is_ok());
        assert!(parse(&["netcalc", "eui64", "00-1B-63"]).validate().is_err());
    }

    #[test]
    fn test_ula_defaults() {
        let args = parse(&["netcalc", "ula"]);
        let Command::Ula(ula) = args.command else {
            panic!("expected ula command");
        };
        assert_eq!(ula.mac, None);
        assert_eq!(ula.subnet_id().unwrap(), SubnetId::default());
        assert!(!ula.no_ntp);
        assert_eq!(ula.ntp_timeout(), Duration::from_millis(DEFAULT_NTP_TIMEOUT_MS));
        assert_eq!(ula.local_address().unwrap(), None);
    }

    #[test]
    fn test_ula_local_address() {
        let args = parse(&["netcalc", "ula", "--address", "fe80::1%eth0"]);
        assert!(args.validate().is_ok());
        let Command::Ula(ula) = args.command else {
            panic!("expected ula command");
        };
        assert_eq!(
            ula.local_address().unwrap(),
            Some("fe80::1".parse::<Address>().unwrap())
        );

        let bad = parse(&["netcalc", "ula", "--address", "192.168.1"]);
        assert!(matches!(bad.validate(), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_ula_options() {
        let args = parse(&[
            "netcalc",
            "ula",
            "--mac",
            "00:1b:63:84:45:e6",
            "--subnet-id",
            "2a",
            "--no-ntp",
            "--ntp-server",
            "time.example.org",
            "--ntp-timeout-ms",
            "500",
            "--interface",
            "eth0",
        ]);
        assert!(args.validate().is_ok());

        let Command::Ula(ula) = args.command else {
            panic!("expected ula command");
        };
        assert_eq!(ula.subnet_id().unwrap(), SubnetId::from(0x2a));
        assert_eq!(
            ula.hardware_address().unwrap().map(|m| m.to_string()).as_deref(),
            Some("00-1B-63-84-45-E6")
        );
        assert!(ula.no_ntp);
        assert_eq!(ula.ntp_server, "time.example.org");
        assert_eq!(ula.ntp_timeout(), Duration::from_millis(500));
        assert_eq!(ula.interface.as_deref(), Some("eth0"));
    }

    #[test]
    fn test_ula_invalid_values() {
        assert!(parse(&["netcalc", "ula", "--subnet-id", "12345"]).validate().is_err());
        assert!(parse(&["netcalc", "ula", "--mac", "nope"]).validate().is_err());
        assert!(matches!(
            parse(&["netcalc", "ula", "--ntp-timeout-ms", "0"]).validate(),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["netcalc", "canonical", "::1", "--json", "-vv", "-o", "out.json"]);
        assert_eq!(args.output_format(), OutputFormat::Json);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.output, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(parse(&["netcalc", "mask", "8"]).log_level(), tracing::Level::WARN);
        assert_eq!(parse(&["netcalc", "-v", "mask", "8"]).log_level(), tracing::Level::INFO);
        assert_eq!(parse(&["netcalc", "-vv", "mask", "8"]).log_level(), tracing::Level::DEBUG);
        assert_eq!(
            parse(&["netcalc", "-vvvv", "mask", "8"]).log_level(),
            tracing::Level::TRACE
        );
    }

    #[test]
    fn test_default_output_format() {
        assert_eq!(parse(&["netcalc", "prefix", "255.0.0.0"]).output_format(), OutputFormat::Text);
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }

    #[test]
    fn test_missing_subcommand() {
        assert!(CalcArgs::from_iter_safe(["netcalc"]).is_err());
    }
}
