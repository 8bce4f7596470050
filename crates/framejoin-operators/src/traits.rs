//! Operator trait + common interfaces.
//!
//! The exec runtime reconstructs an operator from its descriptor and calls
//! `run(...)` once with the operator's input and output streams.

use std::io::{Read, Write};

use thiserror::Error;

use crate::registry::InstructionDescriptor;
use crate::stats::Stats;

/// An input byte stream carrying frames.
pub type InputStream<'a> = Box<dyn Read + Send + 'a>;

/// An output byte stream that receives frames.
pub type OutputStream<'a> = Box<dyn Write + Send + 'a>;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("planning error: {0}")]
    Plan(String),

    #[error("{name} expects {expected_inputs} inputs and {expected_outputs} outputs, got {inputs} and {outputs}")]
    Arity {
        name: &'static str,
        expected_inputs: usize,
        expected_outputs: usize,
        inputs: usize,
        outputs: usize,
    },
}

/// Capability contract every instruction satisfies.
///
/// Invariants:
/// - `name()` is stable; it is the dispatch key in descriptors and traces.
/// - `Instruction::from_descriptor(&op.descriptor())` yields an equivalent op.
/// - `run` returns `Err` only for configuration problems detected before any
///   stream is read. Malformed data is reported through `stats`.
pub trait Operator: Send + Sync + 'static {
    /// Human-readable operator name (stable).
    fn name(&self) -> &'static str;

    /// Wire form used to rebuild this operator on another worker.
    fn descriptor(&self) -> InstructionDescriptor;

    /// Consume `inputs` (in positional order), write to `outputs`, and record
    /// counters and diagnostics in `stats`.
    fn run<'a>(
        &self,
        inputs: Vec<InputStream<'a>>,
        outputs: Vec<OutputStream<'a>>,
        stats: &mut Stats,
    ) -> Result<(), OpError>;
}
