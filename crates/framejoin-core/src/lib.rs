#![forbid(unsafe_code)]
//! framejoin-core: shared value types, engine configuration, strongly-typed
//! IDs, run manifests, and stable hashing.
//!
//! This crate does no I/O. The row wire format lives in `framejoin-codec`,
//! operators in `framejoin-operators`.

pub mod config;
pub mod error;
pub mod hash;
pub mod id;
pub mod manifest;
pub mod prelude;
pub mod types;

/// Engine version string recorded in run manifests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
