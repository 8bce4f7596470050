//! Build phase: materialize the build stream into a hash table.

use std::collections::HashMap;
use std::io::Read;

use framejoin_codec::{decode_row, for_each_frame};
use framejoin_core::types::Row;

use super::key::KeyExtractor;
use super::PhaseError;
use crate::stats::Stats;

/// Canonical key bytes → value columns of the last build row with that key.
///
/// Owned by a single join invocation: written during build, then only read.
#[derive(Debug, Default)]
pub struct BuildTable {
    entries: HashMap<Vec<u8>, Row>,
}

impl BuildTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, replacing any existing value. Returns the replaced value.
    pub fn insert(&mut self, key: Vec<u8>, value: Row) -> Option<Row> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &[u8]) -> Option<&Row> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume `reader` frame by frame into a new table.
    ///
    /// The first malformed frame, out-of-range key, or read failure is recorded
    /// in `stats` and ends the phase; frames after it are not read. The rows
    /// inserted up to that point are kept.
    pub fn build<R: Read>(
        reader: R,
        extractor: &KeyExtractor,
        max_frame_bytes: usize,
        stats: &mut Stats,
    ) -> BuildTable {
        let mut table = BuildTable::new();

        let result = for_each_frame(reader, max_frame_bytes, |payload| -> Result<(), PhaseError> {
            let row = decode_row(payload)?;
            stats.build_rows_read += 1;
            let (key, value) = extractor.extract(row)?;
            let key_bytes = extractor.canonicalize(&key).map_err(PhaseError::Encoding)?;
            if table.insert(key_bytes, value).is_some() {
                stats.build_keys_overwritten += 1;
            }
            Ok(())
        });

        if let Err(e) = result {
            stats.record_error(&e);
        }
        stats.table_entries += table.len() as u64;
        table
    }
}
