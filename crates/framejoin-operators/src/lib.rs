#![forbid(unsafe_code)]
//! framejoin-operators: stream operators and the instruction registry.
//!
//! Design intent:
//! - Operators are synchronous and single-threaded per invocation; callers run
//!   independent invocations on their own threads.
//! - Data errors never escape `Operator::run`. They are counted in `Stats` and
//!   end the phase that hit them. Only configuration errors are returned.
//! - The set of instructions is closed: `registry::Instruction` enumerates it,
//!   and `registry::InstructionDescriptor` is its wire form.

pub mod registry;
pub mod stats;
pub mod traits;

pub mod join;

pub use join::LocalHashJoin;
pub use registry::{Instruction, InstructionDescriptor};
pub use stats::{JoinPhase, Stats};
pub use traits::{InputStream, OpError, Operator, OutputStream};
