//! Deterministic run manifest for audit/replay.
//!
//! The engine emits one manifest per instruction invocation. Replaying the same
//! descriptor over identical input streams must reproduce `output_digest`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hash::Hash256;
use crate::id::PartitionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManifestId(pub Uuid);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub id: ManifestId,

    /// Stable name of the instruction that ran.
    pub instruction: String,

    /// Stable hash of the instruction descriptor.
    pub descriptor_hash: Hash256,

    /// Partition this invocation served, when run through `run_partitions`.
    pub partition: Option<PartitionId>,

    /// Engine version string for provenance.
    pub engine_version: String,

    /// Digest of every byte written to the output stream.
    pub output_digest: Option<Hash256>,
    pub output_bytes: u64,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl RunManifest {
    pub fn new(instruction: impl Into<String>, descriptor_hash: Hash256, started_ms: u64) -> Self {
        Self {
            id: ManifestId(Uuid::new_v4()),
            instruction: instruction.into(),
            descriptor_hash,
            partition: None,
            engine_version: crate::VERSION.to_string(),
            output_digest: None,
            output_bytes: 0,
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn with_partition(mut self, partition: PartitionId) -> Self {
        self.partition = Some(partition);
        self
    }

    pub fn finish(mut self, finished_ms: u64, output_digest: Hash256, output_bytes: u64) -> Self {
        self.finished_ms = finished_ms;
        self.output_digest = Some(output_digest);
        self.output_bytes = output_bytes;
        self
    }
}
