#![forbid(unsafe_code)]
//! framejoin-exec: local runtime for instructions.
//!
//! Rebuilds an instruction from its descriptor, wires bounded buffers around
//! its streams, runs it, and emits a `RunReport` (manifest + stats). Several
//! partitions of the same instruction can run side by side on scoped threads;
//! each gets its own streams, stats, and hash table.

pub mod descriptor;
pub mod metrics;
pub mod replay;
pub mod runtime;

pub use descriptor::{load_descriptor, parse_descriptor, DescriptorFormat};
pub use runtime::{Engine, ExecError, Partition, RunReport};
