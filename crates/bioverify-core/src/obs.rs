//! Structured observability hooks for workflow lifecycle events.
//!
//! This module provides:
//! - Run-scoped tracing spans via `RunSpan` RAII guard
//! - Emission functions for run, settlement, notification and webhook events
//!
//! Events are emitted at `info!` level (warnings for failures). For JSON
//! output, start the binary with `--json`.

use tracing::{info, warn};

/// RAII guard that enters a workflow-scoped tracing span for the duration
/// of a run or resume.
///
/// # Example
///
/// ```ignore
/// let _span = RunSpan::enter("review", "7-bafyroot");
/// // every event below carries workflow = "review", thread_key = "7-bafyroot"
/// ```
pub struct RunSpan {
    _span: tracing::span::EnteredSpan,
}

impl RunSpan {
    pub fn enter(workflow: &str, thread_key: &str) -> Self {
        let span = tracing::info_span!("bioverify.run", workflow = %workflow, thread_key = %thread_key);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a fresh run started.
pub fn emit_run_started(workflow: &str, thread_key: &str) {
    info!(event = "run.started", workflow = %workflow, thread_key = %thread_key);
}

/// Emit event: a step's checkpoint was persisted.
pub fn emit_step_checkpointed(workflow: &str, thread_key: &str, step: &str, seq: u64) {
    info!(
        event = "run.step_checkpointed",
        workflow = %workflow,
        thread_key = %thread_key,
        step = %step,
        seq = seq,
    );
}

/// Emit event: the run suspended on an interrupt.
pub fn emit_run_interrupted(workflow: &str, thread_key: &str, kind: &str) {
    info!(
        event = "run.interrupted",
        workflow = %workflow,
        thread_key = %thread_key,
        kind = %kind,
    );
}

/// Emit event: the run reached its final step.
pub fn emit_run_completed(workflow: &str, thread_key: &str, steps_executed: u64) {
    info!(
        event = "run.completed",
        workflow = %workflow,
        thread_key = %thread_key,
        steps_executed = steps_executed,
    );
}

/// Emit event: a step failed and the run aborted (warning level).
pub fn emit_run_failed(workflow: &str, thread_key: &str, step: &str, error: &dyn std::fmt::Display) {
    warn!(
        event = "run.failed",
        workflow = %workflow,
        thread_key = %thread_key,
        step = %step,
        error = %error,
    );
}

/// Emit event: a settlement transaction was submitted.
pub fn emit_settlement_submitted(network: &str, action: &str, publication_id: u64, tx_hash: &str) {
    info!(
        event = "settlement.submitted",
        network = %network,
        action = %action,
        publication_id = publication_id,
        tx_hash = %tx_hash,
    );
}

/// Emit event: a best-effort notification could not be delivered (warning level).
pub fn emit_notification_failed(action: &str, error: &dyn std::fmt::Display) {
    warn!(event = "notification.failed", action = %action, error = %error);
}

/// Emit event: a webhook delivery was rejected.
pub fn emit_webhook_rejected(route: &str, status: u16, reason: &dyn std::fmt::Display) {
    warn!(
        event = "webhook.rejected",
        route = %route,
        status = status,
        reason = %reason,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_span_create() {
        let _span = RunSpan::enter("submission", "1-bafy");
        emit_run_started("submission", "1-bafy");
    }
}
