//! Input records: marker filtering and delta tokenization.
//!
//! Records are handled as raw bytes. Marker lines and tokens that are never
//! displayed may hold arbitrary bytes (the row-size scanner echoes device
//! strings into its separator lines); only previewed deltas must be decimal integers.

use num_bigint::BigInt;

use crate::error::{GeometryError, Result};

/// Tag that opens a separator line in the scanner's output.
pub const RECORD_SEPARATOR: &str = "[RS]";

/// A delta value. Unbounded, so long tokens print instead of failing.
pub type Delta = BigInt;

/// True when `line` starts with `marker` and must be dropped.
pub fn is_skipped(line: &[u8], marker: &str) -> bool {
    line.starts_with(marker.as_bytes())
}

fn is_separator(b: &u8) -> bool {
    matches!(*b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

/// Delta tokens of a record, split on any run of ASCII whitespace.
pub fn tokens(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.split(is_separator).filter(|t| !t.is_empty())
}

/// Optional sign followed by at least one ASCII digit.
fn is_decimal(token: &[u8]) -> bool {
    let digits = match token.first() {
        Some(b'+') | Some(b'-') => &token[1..],
        _ => token,
    };
    !digits.is_empty() && digits.iter().all(u8::is_ascii_digit)
}

/// Parse one delta as a base-10 integer.
///
/// `line` is the 1-based input line number used in the error.
pub fn parse_delta(token: &[u8], line: usize) -> Result<Delta> {
    let invalid = || GeometryError::Parse {
        line,
        token: String::from_utf8_lossy(token).into_owned(),
    };
    if !is_decimal(token) {
        return Err(invalid());
    }
    BigInt::parse_bytes(token, 10).ok_or_else(invalid)
}
