//! Error types for netcalc-core
//!
//! Every parsing and construction failure in the library is reported through
//! a single error type. Values are either fully valid or never constructed.

/// Result type alias for netcalc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for netcalc operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed textual address (wrong component count, non-numeric, bad delimiter)
    #[error("Invalid address format: {0}")]
    InvalidFormat(String),

    /// Numeric value, usually a prefix length, outside its valid bound
    #[error("Value out of range: {0}")]
    OutOfRange(String),

    /// Netmask that is not a contiguous run of ones followed by zeros
    #[error("Invalid netmask: {0}")]
    InvalidMask(String),

    /// Fixed-size field with the wrong number of bytes
    #[error("Invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Name of the field being checked
        field: &'static str,
        /// Required length in bytes
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Global ID that does not begin with the unique local `0xfd` byte
    #[error("Invalid Global ID prefix: {0}")]
    InvalidPrefix(String),

    /// Address queried against a subnet of the other family
    #[error("{address} is not an {family} address")]
    FamilyMismatch {
        /// Address as given
        address: String,
        /// Family of the subnet
        family: crate::address::Family,
    },

    /// JSON serialization error
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn length(field: &'static str, expected: usize, actual: usize) -> Self {
        Error::InvalidLength {
            field,
            expected,
            actual,
        }
    }
}
