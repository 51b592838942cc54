//! Output formatting for reports
//!
//! Every report renders either as human-readable text or as JSON.
//!
//! # Formats
//!
//! - **Text** - labelled lines, e.g. `Network:\t[192.168.0.0]`
//! - **JSON** - pretty-printed object, one per report
//!
//! # Examples
//!
//! ```
//! use netcalc_core::args::OutputFormat;
//! use netcalc_core::output::render;
//! use netcalc_core::subnet::Subnet;
//! use netcalc_core::types::SubnetSummary;
//!
//! let subnet = Subnet::from_cidr("192.168.0.1/24").unwrap();
//! let text = render(&SubnetSummary::from(&subnet), OutputFormat::Text).unwrap();
//! assert!(text.starts_with("CIDR-Notation:\t[192.168.0.1/24] Netmask: [255.255.255.0]\n"));
//! ```

pub mod common;
pub mod json;
pub mod text;

pub use common::OutputWriter;
pub use json::JsonFormatter;

use crate::args::OutputFormat;
use crate::error::Result;
use serde::Serialize;

/// A report that can be printed as text or serialized as JSON
pub trait Report: Serialize {
    /// Text form, terminated by a newline
    fn to_text(&self) -> String;
}

/// Renders a report in the requested format
pub fn render<R: Report>(report: &R, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.to_text()),
        OutputFormat::Json => JsonFormatter::new().format(report),
    }
}
