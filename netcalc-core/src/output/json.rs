//! JSON output format

use crate::error::Result;
use serde::Serialize;

/// JSON output formatter
///
/// Produces one JSON object per report, pretty-printed unless compact
/// output is requested.
///
/// # Examples
///
/// ```
/// use netcalc_core::output::json::JsonFormatter;
/// use netcalc_core::types::ValueReport;
///
/// let report = ValueReport::new("netmask", "24", "255.255.255.0");
/// let json = JsonFormatter::compact().format(&report).unwrap();
/// assert_eq!(json, r#"{"kind":"netmask","input":"24","value":"255.255.255.0"}"#);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Create a new pretty-printing JsonFormatter
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a JsonFormatter that writes everything on one line
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Serialize a report, terminated by a newline
    pub fn format<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let mut json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        json.push('\n');
        Ok(json)
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
