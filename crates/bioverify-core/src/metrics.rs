//! Global atomic counters for BioVerify observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. on daemon shutdown).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters, lock-free and allocation-free.
pub struct Metrics {
    steps_checkpointed: AtomicU64,
    interrupts_raised: AtomicU64,
    settlements_submitted: AtomicU64,
    notification_failures: AtomicU64,
    webhooks_accepted: AtomicU64,
    webhooks_rejected: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            steps_checkpointed: AtomicU64::new(0),
            interrupts_raised: AtomicU64::new(0),
            settlements_submitted: AtomicU64::new(0),
            notification_failures: AtomicU64::new(0),
            webhooks_accepted: AtomicU64::new(0),
            webhooks_rejected: AtomicU64::new(0),
        }
    }

    pub fn inc_steps_checkpointed(&self) {
        self.steps_checkpointed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "steps_checkpointed", "counter incremented");
    }

    pub fn inc_interrupts(&self) {
        self.interrupts_raised.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "interrupts_raised", "counter incremented");
    }

    pub fn inc_settlements(&self) {
        self.settlements_submitted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "settlements_submitted", "counter incremented");
    }

    pub fn inc_notification_failures(&self) {
        self.notification_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "notification_failures", "counter incremented");
    }

    pub fn inc_webhooks_accepted(&self) {
        self.webhooks_accepted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "webhooks_accepted", "counter incremented");
    }

    pub fn inc_webhooks_rejected(&self) {
        self.webhooks_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "webhooks_rejected", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            steps_checkpointed = self.steps_checkpointed(),
            interrupts_raised = self.interrupts_raised(),
            settlements_submitted = self.settlements_submitted(),
            notification_failures = self.notification_failures(),
            webhooks_accepted = self.webhooks_accepted(),
            webhooks_rejected = self.webhooks_rejected(),
        );
    }

    pub fn steps_checkpointed(&self) -> u64 {
        self.steps_checkpointed.load(Ordering::Relaxed)
    }

    pub fn interrupts_raised(&self) -> u64 {
        self.interrupts_raised.load(Ordering::Relaxed)
    }

    pub fn settlements_submitted(&self) -> u64 {
        self.settlements_submitted.load(Ordering::Relaxed)
    }

    pub fn notification_failures(&self) -> u64 {
        self.notification_failures.load(Ordering::Relaxed)
    }

    pub fn webhooks_accepted(&self) -> u64 {
        self.webhooks_accepted.load(Ordering::Relaxed)
    }

    pub fn webhooks_rejected(&self) -> u64 {
        self.webhooks_rejected.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.steps_checkpointed.store(0, Ordering::Relaxed);
        self.interrupts_raised.store(0, Ordering::Relaxed);
        self.settlements_submitted.store(0, Ordering::Relaxed);
        self.notification_failures.store(0, Ordering::Relaxed);
        self.webhooks_accepted.store(0, Ordering::Relaxed);
        self.webhooks_rejected.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_increment() {
        let m = Metrics::new();
        m.inc_steps_checkpointed();
        m.inc_steps_checkpointed();
        assert_eq!(m.steps_checkpointed(), 2);

        m.inc_interrupts();
        m.inc_settlements();
        m.inc_notification_failures();
        m.inc_webhooks_accepted();
        m.inc_webhooks_rejected();
        m.inc_webhooks_rejected();
        assert_eq!(m.interrupts_raised(), 1);
        assert_eq!(m.settlements_submitted(), 1);
        assert_eq!(m.notification_failures(), 1);
        assert_eq!(m.webhooks_accepted(), 1);
        assert_eq!(m.webhooks_rejected(), 2);
    }

    #[test]
    fn reset_zeroes_all() {
        let m = Metrics::new();
        m.inc_steps_checkpointed();
        m.inc_settlements();
        m.inc_webhooks_rejected();
        m.reset();
        assert_eq!(m.steps_checkpointed(), 0);
        assert_eq!(m.settlements_submitted(), 0);
        assert_eq!(m.webhooks_rejected(), 0);
    }
}
