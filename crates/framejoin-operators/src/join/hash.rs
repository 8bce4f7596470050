//! `LocalHashAndJoinWith`: build-then-probe hash join over two local streams.

use std::io::{Read, Write};

use framejoin_core::config::DEFAULT_MAX_FRAME_BYTES;

use super::build::BuildTable;
use super::key::KeyExtractor;
use super::probe::ProbeJoiner;
use crate::registry::InstructionDescriptor;
use crate::stats::{JoinPhase, Stats};
use crate::traits::{InputStream, OpError, Operator, OutputStream};

pub const NAME: &str = "LocalHashAndJoinWith";

/// Inner equi-join of a build stream (input 0) and a probe stream (input 1).
///
/// The whole build side is held in memory before the first probe row is read,
/// so the smaller / lower-cardinality relation belongs on the build side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalHashJoin {
    extractor: KeyExtractor,
    max_frame_bytes: usize,
}

impl LocalHashJoin {
    pub fn new(key_positions: Vec<usize>) -> Result<Self, OpError> {
        Ok(Self {
            extractor: KeyExtractor::new(key_positions)?,
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        })
    }

    pub fn with_max_frame_bytes(mut self, max_frame_bytes: usize) -> Self {
        self.max_frame_bytes = max_frame_bytes;
        self
    }

    pub fn key_positions(&self) -> &[usize] {
        self.extractor.positions()
    }

    /// Run both phases. Never fails; problems are recorded in `stats`, which
    /// may already hold counters from earlier invocations.
    pub fn execute<B, P, W>(&self, build: B, probe: P, output: W, stats: &mut Stats)
    where
        B: Read,
        P: Read,
        W: Write,
    {
        stats.begin_invocation();
        stats.enter(JoinPhase::Building);
        let table = BuildTable::build(build, &self.extractor, self.max_frame_bytes, stats);
        tracing::debug!(
            entries = table.len(),
            rows = stats.build_rows_read,
            overwritten = stats.build_keys_overwritten,
            "build table ready"
        );

        stats.enter(JoinPhase::Probing);
        ProbeJoiner::new(&table, &self.extractor, self.max_frame_bytes).probe(probe, output, stats);
        drop(table);

        stats.enter(JoinPhase::Done);
        tracing::debug!(
            probe_rows = stats.probe_rows_read,
            emitted = stats.rows_emitted,
            errors = stats.total_errors(),
            "join finished"
        );
    }
}

impl Operator for LocalHashJoin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn descriptor(&self) -> InstructionDescriptor {
        InstructionDescriptor::LocalHashAndJoinWith {
            key_positions: self.key_positions().to_vec(),
        }
    }

    fn run<'a>(
        &self,
        inputs: Vec<InputStream<'a>>,
        outputs: Vec<OutputStream<'a>>,
        stats: &mut Stats,
    ) -> Result<(), OpError> {
        let (n_inputs, n_outputs) = (inputs.len(), outputs.len());
        let arity = || OpError::Arity {
            name: NAME,
            expected_inputs: 2,
            expected_outputs: 1,
            inputs: n_inputs,
            outputs: n_outputs,
        };
        if n_inputs != 2 || n_outputs != 1 {
            return Err(arity());
        }

        let [build, probe]: [InputStream<'a>; 2] = inputs.try_into().map_err(|_| arity())?;
        let [output]: [OutputStream<'a>; 1] = outputs.try_into().map_err(|_| arity())?;
        self.execute(build, probe, output, stats);
        Ok(())
    }
}
