//! Chunk classification of a single record.
//!
//! A record's deltas are walked in chunks of `chunk_len`. The first
//! `preview_len` deltas of each chunk are printed (scaled down) and buffered;
//! when the next delta arrives the chunk is classified: it conflicts when no
//! buffered delta is below `threshold`. A chunk that never reaches that delta
//! is left unclassified.
//!
//! Each chunk line is labelled with a synthetic physical address starting at
//! `base_address` and advancing by `chunk_len` per chunk.

use std::io::Write;

use num_integer::Integer;

use crate::error::Result;
use crate::record::{self, Delta, RECORD_SEPARATOR};
use crate::render::{self, FieldWriter};

/// Constants that shape the report.
#[derive(Debug, Clone)]
pub struct GeometryConfig {
    /// Address printed for the first chunk of every record.
    pub base_address: u64,
    /// Deltas per chunk; also the address stride.
    pub chunk_len: usize,
    /// Deltas printed and inspected at the start of each chunk.
    pub preview_len: usize,
    /// Deltas at or above this value count as slow.
    pub threshold: i64,
    /// Divisor applied to printed deltas (floor division).
    pub scale: i64,
    /// Lines starting with this tag are ignored.
    pub marker: String,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            base_address: 262_144,
            chunk_len: 128,
            preview_len: 20,
            threshold: 100,
            scale: 10,
            marker: RECORD_SEPARATOR.to_string(),
        }
    }
}

/// Outcome of classifying one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordReport {
    /// Addresses of conflicting chunks, in order.
    pub conflicts: Vec<u64>,
    /// Addresses of classified chunks that did not conflict.
    pub no_conflicts: Vec<u64>,
    /// Deltas consumed.
    pub deltas: usize,
    /// Address lines written, including the first.
    pub chunk_lines: usize,
}

impl RecordReport {
    /// Conflict addresses as listed in the report: terminated by a 0 entry.
    pub fn listing(&self) -> Vec<u64> {
        self.conflicts
            .iter()
            .copied()
            .chain(std::iter::once(0))
            .collect()
    }
}

/// True when no previewed delta is below `threshold`.
pub fn is_conflict(preview: &[Delta], threshold: &Delta) -> bool {
    !preview.iter().any(|v| v < threshold)
}

/// Streaming classifier for one record. Output is written as deltas arrive.
pub struct ChunkClassifier<'a, W: Write> {
    config: &'a GeometryConfig,
    out: &'a mut FieldWriter<W>,
    line: usize,
    phys: u64,
    in_chunk: usize,
    preview: Vec<Delta>,
    threshold: Delta,
    scale: Delta,
    report: RecordReport,
}

impl<'a, W: Write> ChunkClassifier<'a, W> {
    /// Start a record and write its first address header.
    pub fn new(config: &'a GeometryConfig, out: &'a mut FieldWriter<W>, line: usize) -> Result<Self> {
        let phys = config.base_address;
        out.field(&render::address_header(phys))?;
        Ok(Self {
            config,
            out,
            line,
            phys,
            in_chunk: 0,
            preview: Vec::with_capacity(config.preview_len),
            threshold: Delta::from(config.threshold),
            scale: Delta::from(config.scale),
            report: RecordReport {
                chunk_lines: 1,
                ..RecordReport::default()
            },
        })
    }

    /// Feed the next delta token.
    ///
    /// Only previewed tokens are parsed; the rest of a chunk is counted as-is.
    pub fn push(&mut self, token: &[u8]) -> Result<()> {
        let cfg = self.config;

        if self.in_chunk < cfg.preview_len {
            let value = record::parse_delta(token, self.line)?;
            self.out.field(&render::delta_field(&value.div_floor(&self.scale)))?;
            self.preview.push(value);
        } else if self.in_chunk == cfg.preview_len {
            self.out.field(render::ELLIPSIS)?;
            if is_conflict(&self.preview, &self.threshold) {
                self.report.conflicts.push(self.phys);
            } else {
                self.report.no_conflicts.push(self.phys);
            }
            self.preview.clear();
        }

        self.in_chunk += 1;
        self.report.deltas += 1;

        if self.in_chunk == cfg.chunk_len {
            self.phys += cfg.chunk_len as u64;
            self.out.end_line()?;
            self.out.field(&render::address_header(self.phys))?;
            self.report.chunk_lines += 1;
            self.in_chunk = 0;
            // a full chunk always passed the classification point above
            self.preview.clear();
        }
        Ok(())
    }

    /// Close the record and write its conflicts listing.
    pub fn finish(self) -> Result<RecordReport> {
        self.out.end_line()?;
        self.out.line("conflicts:")?;
        for phys in self.report.listing() {
            self.out.line(&render::address_entry(phys))?;
        }
        Ok(self.report)
    }
}

/// Classify one record line, writing its report section to `out`.
pub fn classify_record<W: Write>(
    line: &[u8],
    line_no: usize,
    config: &GeometryConfig,
    out: &mut FieldWriter<W>,
) -> Result<RecordReport> {
    let mut classifier = ChunkClassifier::new(config, out, line_no)?;
    for token in record::tokens(line) {
        classifier.push(token)?;
    }
    classifier.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeometryError;

    fn deltas(values: &[i64]) -> String {
        values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" ")
    }

    fn classify(line: &str) -> (RecordReport, String) {
        let config = GeometryConfig::default();
        let mut out = FieldWriter::new(Vec::new());
        let report = classify_record(line.as_bytes(), 1, &config, &mut out).unwrap();
        (report, String::from_utf8(out.into_inner()).unwrap())
    }

    #[test]
    fn test_is_conflict() {
        let slow: Vec<Delta> = [100, 250, 180].iter().map(|&v| Delta::from(v)).collect();
        let mixed: Vec<Delta> = [100, 99, 180].iter().map(|&v| Delta::from(v)).collect();
        let threshold = Delta::from(100);
        assert!(is_conflict(&slow, &threshold));
        assert!(!is_conflict(&mixed, &threshold));
        assert!(is_conflict(&[], &threshold));
    }

    #[test]
    fn test_twenty_slow_deltas_unclassified() {
        let (report, _) = classify(&deltas(&[150; 20]));
        assert!(report.conflicts.is_empty());
        assert!(report.no_conflicts.is_empty());
        assert_eq!(report.listing(), vec![0]);
    }

    #[test]
    fn test_twenty_one_slow_deltas_conflict() {
        let (report, _) = classify(&deltas(&[150; 21]));
        assert_eq!(report.conflicts, vec![262_144]);
        assert!(report.no_conflicts.is_empty());
    }

    #[test]
    fn test_one_fast_delta_clears_conflict() {
        let mut values = vec![150; 21];
        values[7] = 99;
        let (report, _) = classify(&deltas(&values));
        assert!(report.conflicts.is_empty());
        assert_eq!(report.no_conflicts, vec![262_144]);
    }

    #[test]
    fn test_twenty_first_delta_not_inspected() {
        let mut values = vec![150; 21];
        values[20] = 5;
        let (report, _) = classify(&deltas(&values));
        assert_eq!(report.conflicts, vec![262_144]);
    }

    #[test]
    fn test_second_chunk_needs_its_own_twenty_first_delta() {
        let (report, _) = classify(&deltas(&[150; 129]));
        assert_eq!(report.conflicts, vec![262_144]);
        assert_eq!(report.chunk_lines, 2);

        let (report, _) = classify(&deltas(&[150; 149]));
        assert_eq!(report.conflicts, vec![262_144, 262_272]);
        assert_eq!(report.listing(), vec![262_144, 262_272, 0]);
    }

    #[test]
    fn test_mixed_chunks() {
        let mut values = vec![150; 128 + 21];
        values[128 + 3] = 40;
        let (report, _) = classify(&deltas(&values));
        assert_eq!(report.conflicts, vec![262_144]);
        assert_eq!(report.no_conflicts, vec![262_272]);
    }

    #[test]
    fn test_exact_chunk_emits_trailing_header() {
        let (report, out) = classify(&deltas(&[150; 128]));
        assert_eq!(report.chunk_lines, 2);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "0b1000000000010000000: ");
        assert_eq!(lines[2], "conflicts:");
    }

    #[test]
    fn test_output_layout() {
        let (_, out) = classify("1005 95 3 150");
        assert_eq!(
            out,
            "0b1000000000000000000: 100  9  0 15 \nconflicts:\n                 0b0\n"
        );
    }

    #[test]
    fn test_ellipsis_after_preview() {
        let (_, out) = classify(&deltas(&[120; 25]));
        let first = out.lines().next().unwrap();
        assert_eq!(first.matches("12").count(), 20);
        assert!(first.ends_with(" 12 ... "));
    }

    #[test]
    fn test_empty_record() {
        let (report, out) = classify("");
        assert_eq!(report.deltas, 0);
        assert_eq!(out, "0b1000000000000000000: \nconflicts:\n                 0b0\n");
    }

    #[test]
    fn test_negative_delta_floors() {
        let (_, out) = classify("-5");
        assert!(out.starts_with("0b1000000000000000000: -1 \n"));
    }

    #[test]
    fn test_unpreviewed_tokens_not_parsed() {
        let mut tokens: Vec<String> = vec!["150".to_string(); 21];
        tokens.push("garbage".to_string());
        let (report, _) = classify(&tokens.join(" "));
        assert_eq!(report.deltas, 22);
        assert_eq!(report.conflicts, vec![262_144]);
    }

    #[test]
    fn test_unpreviewed_non_utf8_token() {
        let mut line = deltas(&[150; 21]).into_bytes();
        line.extend_from_slice(b" \xff\xfe 150");
        let config = GeometryConfig::default();
        let mut out = FieldWriter::new(Vec::new());
        let report = classify_record(&line, 1, &config, &mut out).unwrap();
        assert_eq!(report.deltas, 23);
        assert_eq!(report.conflicts, vec![262_144]);
    }

    #[test]
    fn test_long_delta_prints_in_full() {
        let (report, out) = classify("99999999999999999999 150");
        assert_eq!(report.deltas, 2);
        assert!(out.starts_with("0b1000000000000000000: 9999999999999999999 15 \n"));
    }

    #[test]
    fn test_bad_previewed_token_fails() {
        let config = GeometryConfig::default();
        let mut out = FieldWriter::new(Vec::new());
        let err = classify_record(b"10 oops", 3, &config, &mut out).unwrap_err();
        assert!(matches!(err, GeometryError::Parse { line: 3, .. }));
        // the first delta was already written
        let partial = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(partial, "0b1000000000000000000:  1");
    }
}
