//! Background workflow runs started by webhooks and vote delivery.
//!
//! Each task owns the single-flight guard for its thread key and releases it
//! when the run or resume returns. Failures are logged; the newest
//! checkpoint stays as the retry point.

use std::sync::Arc;

use bioverify_core::{
    Network, PublicationRef, ReviewResume, ReviewState, RunOutcome, SubmissionState, ThreadKey,
    WorkflowResult,
};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::inflight::InFlightGuard;
use crate::state::Engines;

pub fn spawn_submission(
    engines: Arc<Engines>,
    guard: InFlightGuard,
    network: Network,
    publication: PublicationRef,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _guard = guard;
        let key = publication.thread_key();
        let result = engines
            .submission
            .run(SubmissionState::new(network, publication), &key)
            .await;
        log_outcome("submission", &key, result);
    })
}

pub fn spawn_review(engines: Arc<Engines>, guard: InFlightGuard, state: ReviewState) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _guard = guard;
        let key = state.thread_key();
        let result = engines.review.run(state, &key).await;
        log_outcome("review", &key, result);
    })
}

pub fn spawn_review_resume(
    engines: Arc<Engines>,
    guard: InFlightGuard,
    key: ThreadKey,
    input: ReviewResume,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _guard = guard;
        let result = engines.review.resume(&key, input).await;
        log_outcome("review", &key, result);
    })
}

pub fn spawn_review_retry(engines: Arc<Engines>, guard: InFlightGuard, key: ThreadKey) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _guard = guard;
        let result = engines.review.retry(&key).await;
        log_outcome("review", &key, result);
    })
}

fn log_outcome<S>(workflow: &str, key: &ThreadKey, result: WorkflowResult<RunOutcome<S>>) {
    match result {
        Ok(RunOutcome::Completed(_)) => {
            info!(workflow = workflow, thread_key = %key, "background run completed");
        }
        Ok(RunOutcome::Interrupted { interrupt, .. }) => {
            info!(
                workflow = workflow,
                thread_key = %key,
                interrupt = %interrupt.kind,
                "background run suspended"
            );
        }
        Err(err) => {
            error!(workflow = workflow, thread_key = %key, error = %err, "background run failed");
        }
    }
}
