//! Canonical IPv6 text representation (RFC 5952)
//!
//! Groups render as lowercase hex without leading zeros. The longest run of
//! two or more zero groups is replaced by `::`; when two runs tie, the
//! leftmost one is compressed. A single zero group is never compressed.
//!
//! # Example
//!
//! ```
//! use netcalc_core::format::to_text;
//!
//! let addr = [
//!     0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0xff, 0x00, 0x00, 0x42, 0x83, 0x29,
//! ];
//! assert_eq!(to_text(&addr), "2001:db8::ff00:42:8329");
//! ```

use std::ops::Range;

/// Splits a 16-byte address into eight big-endian 16-bit groups
pub fn groups(address: &[u8; 16]) -> [u16; 8] {
    let mut groups = [0u16; 8];
    for (group, chunk) in groups.iter_mut().zip(address.chunks_exact(2)) {
        *group = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    groups
}

/// Finds the run of zero groups to compress, if any
///
/// Only runs of length two or more qualify, and the first of several
/// equally long runs wins.
fn longest_zero_run(groups: &[u16; 8]) -> Option<Range<usize>> {
    let mut best: Option<Range<usize>> = None;
    let mut i = 0;

    while i < groups.len() {
        if groups[i] != 0 {
            i += 1;
            continue;
        }

        let start = i;
        while i < groups.len() && groups[i] == 0 {
            i += 1;
        }

        let len = i - start;
        let best_len = best.as_ref().map_or(1, |r| r.len());
        if len > best_len {
            best = Some(start..i);
        }
    }

    best
}

fn join_hex(groups: &[u16]) -> String {
    groups
        .iter()
        .map(|g| format!("{:x}", g))
        .collect::<Vec<_>>()
        .join(":")
}

/// Converts a 16-byte IPv6 address into its RFC 5952 canonical text form
///
/// # Examples
///
/// ```
/// use netcalc_core::format::to_text;
///
/// assert_eq!(to_text(&[0u8; 16]), "::");
///
/// let mut loopback = [0u8; 16];
/// loopback[15] = 1;
/// assert_eq!(to_text(&loopback), "::1");
/// ```
pub fn to_text(address: &[u8; 16]) -> String {
    let groups = groups(address);

    match longest_zero_run(&groups) {
        Some(run) => format!(
            "{}::{}",
            join_hex(&groups[..run.start]),
            join_hex(&groups[run.end..])
        ),
        None => join_hex(&groups),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_groups(groups: [u16; 8]) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        for (chunk, g) in bytes.chunks_exact_mut(2).zip(groups) {
            chunk.copy_from_slice(&g.to_be_bytes());
        }
        bytes
    }

    #[test]
    fn test_documentation_address() {
        let addr = from_groups([0x2001, 0x0db8, 0, 0, 0, 0xff00, 0x0042, 0x8329]);
        assert_eq!(to_text(&addr), "2001:db8::ff00:42:8329");
    }

    #[test]
    fn test_longest_run_wins() {
        let mut addr = [
            0x20, 0x01, 0x0d, 0xb8, 0x00, 0x00, 0x00, 0x00, 0x12, 0x34, 0x00, 0x00, 0x00, 0x00,
            0x9a, 0xbc,
        ];
        assert_eq!(to_text(&addr), "2001:db8::1234:0:0:9abc");

        addr[4] = 0x1;
        assert_eq!(to_text(&addr), "2001:db8:100:0:1234::9abc");
    }

    #[test]
    fn test_tie_compresses_leftmost_run() {
        let addr = from_groups([0x2001, 0, 0, 1, 0, 0, 1, 1]);
        assert_eq!(to_text(&addr), "2001::1:0:0:1:1");

        let addr = from_groups([1, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(to_text(&addr), "1::1:0:0:0");
    }

    #[test]
    fn test_single_zero_group_not_compressed() {
        let addr = from_groups([0x2001, 0x0db8, 0, 1, 1, 1, 1, 1]);
        assert_eq!(to_text(&addr), "2001:db8:0:1:1:1:1:1");
    }

    #[test]
    fn test_run_at_edges() {
        assert_eq!(to_text(&from_groups([0, 0, 0, 0, 0, 0, 0, 0])), "::");
        assert_eq!(to_text(&from_groups([0, 0, 0, 0, 0, 0, 0, 1])), "::1");
        assert_eq!(to_text(&from_groups([0xfe80, 0, 0, 0, 0, 0, 0, 0])), "fe80::");
        assert_eq!(to_text(&from_groups([1, 2, 3, 4, 5, 6, 0, 0])), "1:2:3:4:5:6::");
        assert_eq!(to_text(&from_groups([0, 0, 3, 4, 5, 6, 7, 8])), "::3:4:5:6:7:8");
    }

    #[test]
    fn test_single_zero_at_edges() {
        assert_eq!(to_text(&from_groups([0, 1, 2, 3, 4, 5, 6, 7])), "0:1:2:3:4:5:6:7");
        assert_eq!(to_text(&from_groups([1, 2, 3, 4, 5, 6, 7, 0])), "1:2:3:4:5:6:7:0");
    }

    #[test]
    fn test_lowercase_without_leading_zeros() {
        let addr = from_groups([0xABCD, 0x000F, 0x00F0, 0x0F00, 0xF000, 0x0001, 0x0010, 0x0100]);
        assert_eq!(to_text(&addr), "abcd:f:f0:f00:f000:1:10:100");
    }

    #[test]
    fn test_groups_split() {
        let addr = from_groups([1, 2, 3, 4, 5, 6, 7, 0xffff]);
        assert_eq!(groups(&addr), [1, 2, 3, 4, 5, 6, 7, 0xffff]);
    }
}
