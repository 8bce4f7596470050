//! Local hash equi-join.
//!
//! Two strictly sequential phases over two frame streams:
//! 1. Build: every build row goes into a `BuildTable` keyed by the canonical
//!    encoding of its key columns. A later row with the same key replaces the
//!    earlier one, so each probe row matches at most once.
//! 2. Probe: every probe row whose key is in the table produces
//!    `probe key ++ probe value ++ build value`; other probe rows are dropped.
//!
//! An error in either phase ends that phase only. Probing still runs against
//! whatever the build phase managed to insert.

use std::io;

use framejoin_codec::CodecError;
use thiserror::Error;

pub mod build;
pub mod hash;
pub mod key;
pub mod probe;

pub use build::BuildTable;
pub use hash::LocalHashJoin;
pub use key::{KeyError, KeyExtractor};
pub use probe::ProbeJoiner;

/// Why a phase stopped before its stream ended.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error("malformed frame: {0}")]
    Decode(CodecError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("failed to encode: {0}")]
    Encoding(CodecError),

    #[error("upstream read failed: {0}")]
    UpstreamRead(io::Error),
}

impl PhaseError {
    pub fn kind(&self) -> &'static str {
        match self {
            PhaseError::Decode(_) => "decode",
            PhaseError::Key(_) => "key",
            PhaseError::Encoding(_) => "encoding",
            PhaseError::UpstreamRead(_) => "upstream_read",
        }
    }
}

/// Errors surfacing from frame iteration or row decoding: transport failures
/// are upstream reads, anything else is bad bytes.
impl From<CodecError> for PhaseError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Io(io) => PhaseError::UpstreamRead(io),
            other => PhaseError::Decode(other),
        }
    }
}
