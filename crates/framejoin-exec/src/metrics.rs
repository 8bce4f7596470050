//! Metrics/tracing hooks.
//!
//! Everything goes out as `tracing` events; wiring them to a collector is the
//! binary's job.

use crate::runtime::RunReport;

/// Emit one summary event per finished instruction run.
pub fn emit_run(report: &RunReport) {
    let m = &report.manifest;
    let s = &report.stats;
    let elapsed_ms = m.finished_ms.saturating_sub(m.started_ms);
    let partition = m.partition.map(|p| p.get());
    let digest = m.output_digest.map(|d| d.to_string()).unwrap_or_default();

    tracing::info!(
        instruction = %m.instruction,
        partition = ?partition,
        build_rows = s.build_rows_read,
        probe_rows = s.probe_rows_read,
        table_entries = s.table_entries,
        rows_emitted = s.rows_emitted,
        output_bytes = m.output_bytes,
        output_digest = %digest,
        elapsed_ms,
        "instruction finished"
    );

    if s.is_degraded() {
        tracing::warn!(
            instruction = %m.instruction,
            partition = ?partition,
            build_errors = s.build_errors,
            probe_errors = s.probe_errors,
            "instruction finished with errors; output may be incomplete"
        );
    }
}
