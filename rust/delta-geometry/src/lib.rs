//! delta-geometry: conflict map of DRAM row-access timing deltas.
//!
//! Reads a row-timing log with one record of access-time deltas per line, splits
//! each record into 128-delta chunks labelled by a synthetic physical
//! address, and reports which chunks show uniformly slow (conflicting)
//! accesses. Separator lines tagged `[RS]` are ignored.

pub mod classify;
pub mod error;
pub mod record;
pub mod render;

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

pub use classify::{classify_record, ChunkClassifier, GeometryConfig, RecordReport};
pub use error::{GeometryError, Result};

use render::FieldWriter;

/// Counters for a whole input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records classified.
    pub records: usize,
    /// Marker lines dropped.
    pub skipped: usize,
    /// Conflicting chunks across all records.
    pub conflicts: usize,
}

/// Stream every record of `reader` through the classifier into `out`.
///
/// Stops at the first error; output for earlier records (and the partial
/// output of the failing one) has already been written.
///
/// Lines are read as raw bytes; only the deltas that get printed have to be
/// valid text.
pub fn process<R: BufRead, W: Write>(mut reader: R, out: W, config: &GeometryConfig) -> Result<RunSummary> {
    let mut out = FieldWriter::new(out);
    let mut summary = RunSummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf);

        if record::is_skipped(line, &config.marker) {
            log::trace!("line {}: skipped marker line", line_no);
            summary.skipped += 1;
            continue;
        }

        let report = classify_record(line, line_no, config, &mut out)?;
        log::debug!(
            "line {}: {} deltas, {} chunk lines, {} conflicts, {} clear",
            line_no,
            report.deltas,
            report.chunk_lines,
            report.conflicts.len(),
            report.no_conflicts.len()
        );

        summary.records += 1;
        summary.conflicts += report.conflicts.len();
    }

    out.flush()?;
    Ok(summary)
}

/// Open `path` and process it.
pub fn run<P: AsRef<Path>, W: Write>(path: P, out: W, config: &GeometryConfig) -> Result<RunSummary> {
    let path = path.as_ref();
    let file = File::open(path)?;
    log::debug!("reading deltas from {}", path.display());
    process(BufReader::new(file), out, config)
}
