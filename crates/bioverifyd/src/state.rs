//! Application state for API handlers

use std::sync::Arc;

use bioverify_core::{
    review_workflow, submission_workflow, Capabilities, CheckpointStore, ReviewState, SubmissionState,
    WebhookSecrets, WorkflowEngine,
};

use crate::inflight::InFlight;

/// Both workflows, bound to one checkpoint store.
pub struct Engines {
    pub submission: WorkflowEngine<SubmissionState>,
    pub review: WorkflowEngine<ReviewState>,
}

impl Engines {
    pub fn new(capabilities: &Capabilities, store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            submission: submission_workflow(capabilities, store.clone()),
            review: review_workflow(capabilities, store),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engines: Arc<Engines>,

    /// Per-network webhook secrets for each event route
    pub secrets: Arc<WebhookSecrets>,

    /// Bearer token for vote delivery and thread inspection
    pub operator_token: Option<Arc<str>>,

    /// Thread keys with a run or resume executing in the background
    pub inflight: InFlight,

    /// Daemon version
    pub version: String,

    /// Daemon start time
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(engines: Engines, secrets: WebhookSecrets, operator_token: Option<String>) -> Self {
        Self {
            engines: Arc::new(engines),
            secrets: Arc::new(secrets),
            operator_token: operator_token.map(Arc::from),
            inflight: InFlight::new(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: chrono::Utc::now(),
        }
    }

    /// Get uptime as a human-readable string
    pub fn uptime(&self) -> String {
        let secs = (chrono::Utc::now() - self.started_at).num_seconds();

        if secs < 60 {
            format!("{}s", secs)
        } else if secs < 3600 {
            format!("{}m {}s", secs / 60, secs % 60)
        } else if secs < 86400 {
            format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else {
            format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
        }
    }
}
