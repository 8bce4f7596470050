//! Key/value split of a decoded row.

use framejoin_codec::{encode_row_into, CodecError};
use framejoin_core::types::{Row, Scalar};
use thiserror::Error;

use crate::traits::OpError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("key position {position} out of range for row of width {width}")]
    OutOfRange { position: usize, width: usize },
}

/// Projects configured column positions out of rows.
///
/// Both join sides use the same extractor, so keys are taken in the same
/// order and canonicalized by the same routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyExtractor {
    /// Positions in configured (key) order.
    positions: Vec<usize>,
    /// Same positions, ascending, for membership tests.
    sorted: Vec<usize>,
}

impl KeyExtractor {
    /// Rejects an empty list and repeated positions.
    pub fn new(positions: Vec<usize>) -> Result<Self, OpError> {
        if positions.is_empty() {
            return Err(OpError::Plan("join needs at least one key position".into()));
        }
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        if let Some(w) = sorted.windows(2).find(|w| w[0] == w[1]) {
            return Err(OpError::Plan(format!("key position {} listed twice", w[0])));
        }
        Ok(Self { positions, sorted })
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Split `row` into (key, value). The value keeps the non-key fields in
    /// their original order.
    pub fn extract(&self, mut row: Row) -> Result<(Row, Row), KeyError> {
        let width = row.len();
        if let Some(&position) = self.positions.iter().find(|&&p| p >= width) {
            return Err(KeyError::OutOfRange { position, width });
        }

        let key: Row = self
            .positions
            .iter()
            .map(|&p| std::mem::replace(&mut row[p], Scalar::Null))
            .collect();
        let value: Row = row
            .into_iter()
            .enumerate()
            .filter(|(i, _)| self.sorted.binary_search(i).is_err())
            .map(|(_, v)| v)
            .collect();
        Ok((key, value))
    }

    /// Canonical key bytes: the shared row encoding of `key`.
    pub fn canonicalize(&self, key: &[Scalar]) -> Result<Vec<u8>, CodecError> {
        let mut out: Vec<u8> = Vec::new();
        self.canonicalize_into(key, &mut out)?;
        Ok(out)
    }

    /// Like [`KeyExtractor::canonicalize`], reusing `buf`.
    pub fn canonicalize_into(&self, key: &[Scalar], buf: &mut Vec<u8>) -> Result<(), CodecError> {
        buf.clear();
        encode_row_into(key, buf)
    }
}
