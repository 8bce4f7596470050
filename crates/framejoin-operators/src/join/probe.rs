//! Probe phase: stream rows against a finished `BuildTable`.

use std::io::{self, Read, Write};

use framejoin_codec::{decode_row, for_each_frame, FrameWriter};

use super::build::BuildTable;
use super::key::KeyExtractor;
use super::PhaseError;
use crate::stats::Stats;

pub struct ProbeJoiner<'t> {
    table: &'t BuildTable,
    extractor: &'t KeyExtractor,
    max_frame_bytes: usize,
}

impl<'t> ProbeJoiner<'t> {
    pub fn new(table: &'t BuildTable, extractor: &'t KeyExtractor, max_frame_bytes: usize) -> Self {
        Self {
            table,
            extractor,
            max_frame_bytes,
        }
    }

    /// Join every probe frame against the table, writing matches to `output`
    /// in arrival order.
    ///
    /// With an empty table the probe stream is still read to its end (and
    /// discarded) so whatever is producing it never blocks on us.
    pub fn probe<R: Read, W: Write>(&self, reader: R, output: W, stats: &mut Stats) {
        if self.table.is_empty() {
            drain(reader, stats);
            return;
        }

        let mut out = FrameWriter::new(output);
        let mut key_buf = Vec::new();

        let result = for_each_frame(reader, self.max_frame_bytes, |payload| -> Result<(), PhaseError> {
            let row = decode_row(payload)?;
            stats.probe_rows_read += 1;
            let (key, value) = self.extractor.extract(row)?;
            self.extractor
                .canonicalize_into(&key, &mut key_buf)
                .map_err(PhaseError::Encoding)?;

            if let Some(matched) = self.table.get(&key_buf) {
                out.write_row_parts(&[&key, &value, matched])
                    .map_err(PhaseError::Encoding)?;
                stats.rows_emitted += 1;
            }
            Ok(())
        });

        if let Err(e) = result {
            stats.record_error(&e);
        }
        if let Err(e) = out.flush() {
            stats.record_error(&PhaseError::Encoding(e));
        }
    }
}

fn drain<R: Read>(mut reader: R, stats: &mut Stats) {
    match io::copy(&mut reader, &mut io::sink()) {
        Ok(n) => stats.probe_bytes_drained += n,
        Err(e) => stats.record_error(&PhaseError::UpstreamRead(e)),
    }
}
