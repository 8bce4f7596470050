//! Statistics / diagnostics sink updated by operators during a run.
//!
//! A run can finish "successfully" while having dropped data: callers must
//! check [`Stats::is_degraded`] rather than rely on `run`'s return value.
//!
//! One sink may be shared by several invocations in sequence. Counters add up
//! across them; `phase` describes the most recent one.

use serde::Serialize;

use crate::join::PhaseError;

/// Default number of error messages retained per run.
pub const DEFAULT_MAX_DIAGNOSTICS: usize = 16;

/// `Idle → Building → Probing → Done`. Never moves backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum JoinPhase {
    #[default]
    Idle,
    Building,
    Probing,
    Done,
}

/// One recorded phase error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub phase: JoinPhase,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub phase: JoinPhase,
    /// Join invocations that have started against this sink.
    pub invocations: u64,

    /// Build rows decoded successfully.
    pub build_rows_read: u64,
    /// Probe rows decoded successfully.
    pub probe_rows_read: u64,
    pub rows_emitted: u64,

    /// Distinct keys held by the table when probing started, summed over
    /// invocations.
    pub table_entries: u64,
    /// Build rows whose key replaced an earlier entry.
    pub build_keys_overwritten: u64,

    pub build_errors: u64,
    pub probe_errors: u64,

    /// Bytes discarded from the probe stream when the table was empty.
    pub probe_bytes_drained: u64,

    pub diagnostics: Vec<Diagnostic>,
    /// Errors counted but not kept because `diagnostics` was full.
    pub diagnostics_dropped: u64,

    #[serde(skip)]
    max_diagnostics: usize,
}

impl Default for Stats {
    fn default() -> Self {
        Self::with_diagnostic_limit(DEFAULT_MAX_DIAGNOSTICS)
    }
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_diagnostic_limit(max_diagnostics: usize) -> Self {
        Self {
            phase: JoinPhase::Idle,
            invocations: 0,
            build_rows_read: 0,
            probe_rows_read: 0,
            rows_emitted: 0,
            table_entries: 0,
            build_keys_overwritten: 0,
            build_errors: 0,
            probe_errors: 0,
            probe_bytes_drained: 0,
            diagnostics: Vec::new(),
            diagnostics_dropped: 0,
            max_diagnostics,
        }
    }

    /// Start a new invocation: `phase` goes back to `Idle`, counters are kept.
    pub fn begin_invocation(&mut self) {
        self.invocations += 1;
        self.phase = JoinPhase::Idle;
        tracing::debug!(invocation = self.invocations, "join invocation started");
    }

    /// Move to `next` within the current invocation.
    pub fn enter(&mut self, next: JoinPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "join phase transition");
        self.phase = next;
    }

    /// Count `err` against the current phase and keep its message if there is
    /// room.
    pub fn record_error(&mut self, err: &PhaseError) {
        match self.phase {
            JoinPhase::Building => self.build_errors += 1,
            _ => self.probe_errors += 1,
        }
        tracing::warn!(phase = ?self.phase, kind = err.kind(), error = %err, "phase stopped early");

        if self.diagnostics.len() < self.max_diagnostics {
            self.diagnostics.push(Diagnostic {
                phase: self.phase,
                kind: err.kind(),
                message: err.to_string(),
            });
        } else {
            self.diagnostics_dropped += 1;
        }
    }

    pub fn total_errors(&self) -> u64 {
        self.build_errors + self.probe_errors
    }

    /// True when some phase stopped before its stream ended. Output may be
    /// missing rows even though the run returned `Ok`.
    pub fn is_degraded(&self) -> bool {
        self.total_errors() > 0
    }
}
