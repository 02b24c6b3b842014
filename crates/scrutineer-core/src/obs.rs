//! Structured observability hooks for Scrutineer run lifecycle events.
//!
//! This module provides:
//! - Run-scoped tracing spans via [`run_span`]
//! - Emission functions for key lifecycle events: start, verdict, gate, commit, finish
//!
//! Events are emitted at `info!` level (configurable via `RUST_LOG`).
//! For JSON output, pass `--json` to the CLI.

use tracing::{info, warn};

/// Span tagged with the run_id; instrument a run's future with it.
///
/// # Example
///
/// ```ignore
/// async { /* ... */ }.instrument(run_span(&run_id)).await
/// // every event inside carries run_id
/// ```
pub fn run_span(run_id: &uuid::Uuid) -> tracing::Span {
    tracing::info_span!("scrutineer.run", run_id = %run_id)
}

/// Emit event: run started for a session and category label.
pub fn emit_run_started(run_id: &uuid::Uuid, session_id: &str, category: &str) {
    info!(
        event = "run.started",
        run_id = %run_id,
        session_id = %session_id,
        category = %category,
    );
}

/// Emit event: run resumed from the confirmation gate.
pub fn emit_run_resumed(run_id: &uuid::Uuid, session_id: &str) {
    info!(event = "run.resumed", run_id = %run_id, session_id = %session_id);
}

/// Emit event: category label did not resolve.
pub fn emit_category_not_found(requested: &str, valid_count: usize) {
    info!(
        event = "rules.category_not_found",
        requested = %requested,
        valid_count = valid_count,
    );
}

/// Emit event: the judge ruled on a task.
pub fn emit_verdict(category: &str, compliant: bool) {
    info!(event = "check.verdict", category = %category, compliant = compliant);
}

/// Emit event: an alternative was proposed, with the re-check result if one ran.
pub fn emit_alternative_proposed(run_id: &uuid::Uuid, recheck_compliant: Option<bool>) {
    info!(
        event = "proposer.suggested",
        run_id = %run_id,
        recheck_compliant = ?recheck_compliant,
    );
}

/// Emit event: the gate parked a run awaiting a decision.
pub fn emit_confirmation_requested(run_id: &uuid::Uuid, request_id: &str) {
    info!(event = "gate.pending", run_id = %run_id, request_id = %request_id);
}

/// Emit event: a reviewer decision was applied.
pub fn emit_confirmation_resolved(run_id: &uuid::Uuid, request_id: &str, approved: bool) {
    info!(
        event = "gate.resolved",
        run_id = %run_id,
        request_id = %request_id,
        approved = approved,
    );
}

/// Emit event: a task was appended to the ledger.
pub fn emit_task_committed(run_id: &uuid::Uuid, ledger_len: usize) {
    info!(event = "ledger.appended", run_id = %run_id, ledger_len = ledger_len);
}

/// Emit event: run came to rest.
pub fn emit_run_finished(run_id: &uuid::Uuid, state: &dyn std::fmt::Display, duration_ms: u64) {
    info!(
        event = "run.finished",
        run_id = %run_id,
        state = %state,
        duration_ms = duration_ms,
    );
}

/// Emit event: run stopped on an error (warning level).
pub fn emit_run_failed(run_id: &uuid::Uuid, error: &dyn std::fmt::Display) {
    warn!(event = "run.failed", run_id = %run_id, error = %error);
}

/// Emit event: long-term memory write failed (warning level).
pub fn emit_memory_persist_error(run_id: &uuid::Uuid, error: &dyn std::fmt::Display) {
    warn!(event = "memory.persist_error", run_id = %run_id, error = %error);
}
