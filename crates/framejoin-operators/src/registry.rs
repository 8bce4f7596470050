//! The closed set of instructions and their wire descriptors.
//!
//! A coordinator ships `InstructionDescriptor`s (JSON/YAML) to workers; the
//! worker turns each back into an `Instruction` and runs it. Unknown names are
//! rejected at deserialization time.

use serde::{Deserialize, Serialize};

use crate::join::LocalHashJoin;
use crate::stats::Stats;
use crate::traits::{InputStream, OpError, Operator, OutputStream};

/// Wire form of an instruction: `{"name": "...", ...params}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum InstructionDescriptor {
    LocalHashAndJoinWith { key_positions: Vec<usize> },
}

impl InstructionDescriptor {
    pub fn name(&self) -> &'static str {
        match self {
            InstructionDescriptor::LocalHashAndJoinWith { .. } => crate::join::hash::NAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    LocalHashAndJoinWith(LocalHashJoin),
}

impl Instruction {
    /// Rebuild an instruction, validating its parameters.
    pub fn from_descriptor(desc: &InstructionDescriptor) -> Result<Self, OpError> {
        match desc {
            InstructionDescriptor::LocalHashAndJoinWith { key_positions } => Ok(
                Instruction::LocalHashAndJoinWith(LocalHashJoin::new(key_positions.clone())?),
            ),
        }
    }

    /// Apply the engine's frame size limit to instructions that read frames.
    pub fn with_max_frame_bytes(self, max_frame_bytes: usize) -> Self {
        match self {
            Instruction::LocalHashAndJoinWith(op) => {
                Instruction::LocalHashAndJoinWith(op.with_max_frame_bytes(max_frame_bytes))
            }
        }
    }

    fn as_operator(&self) -> &dyn Operator {
        match self {
            Instruction::LocalHashAndJoinWith(op) => op,
        }
    }
}

impl Operator for Instruction {
    fn name(&self) -> &'static str {
        self.as_operator().name()
    }

    fn descriptor(&self) -> InstructionDescriptor {
        self.as_operator().descriptor()
    }

    fn run<'a>(
        &self,
        inputs: Vec<InputStream<'a>>,
        outputs: Vec<OutputStream<'a>>,
        stats: &mut Stats,
    ) -> Result<(), OpError> {
        self.as_operator().run(inputs, outputs, stats)
    }
}
