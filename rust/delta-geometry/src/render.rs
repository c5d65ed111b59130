//! Field-oriented text output.
//!
//! Report lines are built from fields separated by single spaces. A line that
//! has any field on it is closed with a space before the newline, so the
//! output matches the historical report format byte for byte:
//!
//! ```text
//! 0b1000000000000000000: 12 10 ...
//! conflicts:
//!                  0b0
//! ```

use std::io::{self, Write};

use crate::record::Delta;

/// Width of the right-justified address column.
pub const ADDRESS_WIDTH: usize = 20;

/// Width of each scaled delta column.
pub const DELTA_WIDTH: usize = 2;

/// Marker printed once per chunk after the previewed deltas.
pub const ELLIPSIS: &str = "...";

/// Binary form of an address: `0b` prefix, lowercase digits, `0b0` for zero.
pub fn binary(value: u64) -> String {
    format!("{value:#b}")
}

/// Address header field: binary address right-justified and followed by `:`.
pub fn address_header(phys: u64) -> String {
    format!("{:>width$}:", binary(phys), width = ADDRESS_WIDTH)
}

/// Address entry of the conflicts listing (no trailing colon).
pub fn address_entry(phys: u64) -> String {
    format!("{:>width$}", binary(phys), width = ADDRESS_WIDTH)
}

/// Scaled delta field. Values wider than the column are printed in full.
pub fn delta_field(scaled: &Delta) -> String {
    format!("{:>width$}", scaled, width = DELTA_WIDTH)
}

/// Writes space-separated fields and tracks whether the current line is open.
pub struct FieldWriter<W: Write> {
    out: W,
    /// True when at least one field has been written on the current line.
    pending_space: bool,
}

impl<W: Write> FieldWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pending_space: false,
        }
    }

    /// Append one field to the current line.
    pub fn field(&mut self, text: &str) -> io::Result<()> {
        if self.pending_space {
            self.out.write_all(b" ")?;
        }
        self.out.write_all(text.as_bytes())?;
        self.pending_space = true;
        Ok(())
    }

    /// Close the current line.
    pub fn end_line(&mut self) -> io::Result<()> {
        if self.pending_space {
            self.out.write_all(b" ")?;
        }
        self.out.write_all(b"\n")?;
        self.pending_space = false;
        Ok(())
    }

    /// Write a complete line consisting of a single field.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        if self.pending_space {
            self.end_line()?;
        }
        self.out.write_all(text.as_bytes())?;
        self.out.write_all(b"\n")
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
