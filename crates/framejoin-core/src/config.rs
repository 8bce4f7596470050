//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound on a single frame's payload unless overridden (64 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Frames whose declared length exceeds this are treated as malformed.
    pub max_frame_bytes: usize,

    /// Capacity of the buffered reader wrapped around each input stream.
    pub read_buffer_bytes: usize,

    /// Capacity of the buffered writer wrapped around each output stream.
    pub write_buffer_bytes: usize,

    /// Partitions run concurrently at most this many at a time.
    pub max_parallel_tasks: usize,

    /// Number of error messages kept per run in the stats sink.
    pub max_diagnostics: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
            read_buffer_bytes: 64 * 1024,
            write_buffer_bytes: 64 * 1024,
            max_parallel_tasks: 4,
            max_diagnostics: 16,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `FRAMEJOIN_MAX_FRAME_BYTES`: largest accepted frame payload
    /// - `FRAMEJOIN_READ_BUFFER_BYTES`: input buffer capacity
    /// - `FRAMEJOIN_WRITE_BUFFER_BYTES`: output buffer capacity
    /// - `FRAMEJOIN_MAX_PARALLEL_TASKS`: concurrent partitions
    /// - `FRAMEJOIN_MAX_DIAGNOSTICS`: retained error messages per run
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] but with an injectable lookup, so
    /// tests don't have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let parse = |key: &str| lookup(key).and_then(|s| s.trim().parse::<usize>().ok());

        if let Some(v) = parse("FRAMEJOIN_MAX_FRAME_BYTES") {
            cfg.max_frame_bytes = v;
        }
        if let Some(v) = parse("FRAMEJOIN_READ_BUFFER_BYTES") {
            cfg.read_buffer_bytes = v;
        }
        if let Some(v) = parse("FRAMEJOIN_WRITE_BUFFER_BYTES") {
            cfg.write_buffer_bytes = v;
        }
        if let Some(v) = parse("FRAMEJOIN_MAX_PARALLEL_TASKS") {
            cfg.max_parallel_tasks = v;
        }
        if let Some(v) = parse("FRAMEJOIN_MAX_DIAGNOSTICS") {
            cfg.max_diagnostics = v;
        }

        cfg
    }

    /// Reject values that would make the engine unable to make progress.
    pub fn validate(&self) -> Result<()> {
        if self.max_frame_bytes == 0 {
            return Err(Error::Config("max_frame_bytes must be > 0".into()));
        }
        if self.read_buffer_bytes == 0 || self.write_buffer_bytes == 0 {
            return Err(Error::Config("buffer sizes must be > 0".into()));
        }
        if self.max_parallel_tasks == 0 {
            return Err(Error::Config("max_parallel_tasks must be > 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            ("FRAMEJOIN_MAX_FRAME_BYTES", "1024"),
            ("FRAMEJOIN_MAX_PARALLEL_TASKS", " 8 "),
            ("FRAMEJOIN_READ_BUFFER_BYTES", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let cfg = EngineConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.max_frame_bytes, 1024);
        assert_eq!(cfg.max_parallel_tasks, 8);
        assert_eq!(cfg.read_buffer_bytes, EngineConfig::default().read_buffer_bytes);
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let cfg = EngineConfig {
            max_parallel_tasks: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"max_diagnostics": 2}"#).unwrap();
        assert_eq!(cfg.max_diagnostics, 2);
        assert_eq!(cfg.max_frame_bytes, DEFAULT_MAX_FRAME_BYTES);
    }
}
