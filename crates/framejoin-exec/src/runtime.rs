//! Runtime: run instructions from descriptors and emit a `RunReport`.
//!
//! Behavior:
//! - Instantiates instructions via `framejoin-operators::registry`.
//! - Wraps every stream in a buffer sized by `EngineConfig`.
//! - Digests the output stream so replays can be compared byte for byte.
//! - A degraded run (phase errors) still returns `Ok`; check `stats`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;

use framejoin_core::prelude::{EngineConfig, PartitionId, RunManifest, StreamDigest};

use framejoin_operators::stats::Stats;
use framejoin_operators::traits::{InputStream, OpError, Operator, OutputStream};
use framejoin_operators::{Instruction, InstructionDescriptor};

use crate::metrics;
use crate::replay::{hash_descriptor, DigestWriter};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Core(#[from] framejoin_core::error::Error),
    #[error("operator: {0}")]
    Operator(#[from] OpError),
    #[error("invalid descriptor: {0}")]
    Descriptor(String),
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("partition {0} panicked")]
    Panicked(PartitionId),
}

/// Outcome of one instruction invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub manifest: RunManifest,
    pub stats: Stats,
}

/// Streams for one partition of a partitioned run.
pub struct Partition<'a> {
    pub id: PartitionId,
    pub inputs: Vec<InputStream<'a>>,
    pub output: OutputStream<'a>,
}

/// Engine owns the configuration shared by every run it performs.
#[derive(Debug, Clone)]
pub struct Engine {
    cfg: EngineConfig,
}

impl Engine {
    pub fn new(cfg: EngineConfig) -> Result<Self, ExecError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Rebuild an instruction with this engine's limits applied.
    pub fn instantiate(&self, desc: &InstructionDescriptor) -> Result<Instruction, ExecError> {
        Ok(Instruction::from_descriptor(desc)?.with_max_frame_bytes(self.cfg.max_frame_bytes))
    }

    /// Run `desc` over `inputs` (positional) writing to `output`.
    pub fn run<'a>(
        &self,
        desc: &InstructionDescriptor,
        inputs: Vec<InputStream<'a>>,
        output: OutputStream<'a>,
    ) -> Result<RunReport, ExecError> {
        self.execute(desc, inputs, output, None)
    }

    /// Open `inputs` and create `output`, then [`Engine::run`].
    pub fn run_files(
        &self,
        desc: &InstructionDescriptor,
        inputs: &[PathBuf],
        output: &Path,
    ) -> Result<RunReport, ExecError> {
        let streams = inputs
            .iter()
            .map(|p| {
                File::open(p)
                    .map(|f| Box::new(f) as InputStream<'static>)
                    .map_err(|source| ExecError::Io {
                        path: p.display().to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let out = File::create(output).map_err(|source| ExecError::Io {
            path: output.display().to_string(),
            source,
        })?;
        self.run(desc, streams, Box::new(out))
    }

    /// Run one independent invocation of `desc` per partition, at most
    /// `max_parallel_tasks` at a time. Results come back in partition order;
    /// one partition failing does not affect the others.
    pub fn run_partitions<'a>(
        &self,
        desc: &InstructionDescriptor,
        partitions: Vec<Partition<'a>>,
    ) -> Vec<Result<RunReport, ExecError>> {
        let mut results = Vec::with_capacity(partitions.len());
        let mut pending = partitions.into_iter().peekable();

        while pending.peek().is_some() {
            let wave: Vec<Partition<'a>> =
                pending.by_ref().take(self.cfg.max_parallel_tasks).collect();

            std::thread::scope(|s| {
                let handles: Vec<_> = wave
                    .into_iter()
                    .map(|p| {
                        let id = p.id;
                        let handle =
                            s.spawn(move || self.execute(desc, p.inputs, p.output, Some(id)));
                        (id, handle)
                    })
                    .collect();

                for (id, handle) in handles {
                    results.push(
                        handle
                            .join()
                            .unwrap_or_else(|_| Err(ExecError::Panicked(id))),
                    );
                }
            });
        }

        results
    }

    fn execute<'a>(
        &self,
        desc: &InstructionDescriptor,
        inputs: Vec<InputStream<'a>>,
        output: OutputStream<'a>,
        partition: Option<PartitionId>,
    ) -> Result<RunReport, ExecError> {
        let inst = self.instantiate(desc)?;
        let descriptor_hash = hash_descriptor(desc)?;

        let mut manifest = RunManifest::new(inst.name(), descriptor_hash, now_millis());
        if let Some(id) = partition {
            manifest = manifest.with_partition(id);
        }

        let read_cap = self.cfg.read_buffer_bytes;
        let inputs: Vec<InputStream<'a>> = inputs
            .into_iter()
            .map(|r| Box::new(BufReader::with_capacity(read_cap, r)) as InputStream<'a>)
            .collect();

        let mut digest = StreamDigest::new();
        let mut stats = Stats::with_diagnostic_limit(self.cfg.max_diagnostics);
        {
            let output: OutputStream<'_> = Box::new(BufWriter::with_capacity(
                self.cfg.write_buffer_bytes,
                DigestWriter::new(output, &mut digest),
            ));
            inst.run(inputs, vec![output], &mut stats)?;
        }

        let manifest = manifest.finish(now_millis(), digest.finish(), digest.bytes());
        let report = RunReport { manifest, stats };
        metrics::emit_run(&report);
        Ok(report)
    }
}

// --- helpers ---

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
