//! Convenient re-exports for downstream crates.

pub use crate::config::EngineConfig;
pub use crate::error::{Error, Result};
pub use crate::hash::{Hash256, StreamDigest};
pub use crate::id::PartitionId;
pub use crate::manifest::{ManifestId, RunManifest};
pub use crate::types::{Row, Scalar};
