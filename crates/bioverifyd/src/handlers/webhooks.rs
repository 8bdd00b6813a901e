//! Contract event webhooks.
//!
//! The signature is verified before the body is looked at. An authenticated
//! delivery is acknowledged with 202 and its workflow runs in the background,
//! so the provider's retry timer never waits on an LLM or chain call.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bioverify_core::metrics::METRICS;
use bioverify_core::obs::emit_webhook_rejected;
use bioverify_core::webhook::{ingest, Ingest, PickedReviewers, SubmittedPublication, SIGNATURE_HEADER};
use bioverify_core::{BioVerifyError, ReviewState, ThreadKey, REVIEW_WORKFLOW, SUBMISSION_WORKFLOW};
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::runs::{spawn_review, spawn_submission};
use crate::state::AppState;

pub const SUBMISSION_ROUTE: &str = "/api/webhooks/alchemy/submission";
pub const PICKED_REVIEWERS_ROUTE: &str = "/api/webhooks/alchemy/picked-reviewers";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_key: Option<String>,
}

impl WebhookAck {
    fn ignored() -> Response {
        let ack = WebhookAck {
            status: "ignored",
            thread_key: None,
        };
        (StatusCode::OK, Json(ack)).into_response()
    }

    fn accepted(key: &ThreadKey) -> Response {
        let ack = WebhookAck {
            status: "accepted",
            thread_key: Some(key.to_string()),
        };
        (StatusCode::ACCEPTED, Json(ack)).into_response()
    }
}

/// `SubmittedPublication` → Submission Verification.
pub async fn submission_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let ingested = ingest::<SubmittedPublication>(&state.secrets.submission, &body, signature(&headers));
    let (network, event) = match ingested {
        Ok(Ingest::Event { network, event }) => (network, event),
        Ok(Ingest::Ignored) => return WebhookAck::ignored(),
        Err(err) => return reject(SUBMISSION_ROUTE, err),
    };
    METRICS.inc_webhooks_accepted();

    let key = event.publication.thread_key();
    info!(
        network = network.as_str(),
        thread_key = %key,
        publisher = %event.publisher,
        "submission received"
    );
    match state.inflight.try_acquire(SUBMISSION_WORKFLOW, &key) {
        Some(guard) => {
            spawn_submission(state.engines.clone(), guard, network, event.publication);
        }
        None => info!(thread_key = %key, "submission already running, skipping trigger"),
    }
    WebhookAck::accepted(&key)
}

/// `PickedReviewers` → Review Consensus & Settlement.
pub async fn picked_reviewers_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let ingested = ingest::<PickedReviewers>(&state.secrets.picked_reviewers, &body, signature(&headers));
    let (network, event) = match ingested {
        Ok(Ingest::Event { network, event }) => (network, event),
        Ok(Ingest::Ignored) => return WebhookAck::ignored(),
        Err(err) => return reject(PICKED_REVIEWERS_ROUTE, err),
    };

    let review = match ReviewState::new(event.into_review_input(network)) {
        Ok(review) => review,
        Err(err) => return reject(PICKED_REVIEWERS_ROUTE, err),
    };
    METRICS.inc_webhooks_accepted();

    let key = review.thread_key();
    info!(
        network = network.as_str(),
        thread_key = %key,
        reviewers = review.human_reviews.len(),
        quorum = review.min_valid_reviews_count,
        "reviewers picked"
    );
    match state.inflight.try_acquire(REVIEW_WORKFLOW, &key) {
        Some(guard) => {
            spawn_review(state.engines.clone(), guard, review);
        }
        None => info!(thread_key = %key, "review already running, skipping trigger"),
    }
    WebhookAck::accepted(&key)
}

fn signature(headers: &HeaderMap) -> Option<&str> {
    headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok())
}

fn reject(route: &str, err: BioVerifyError) -> Response {
    let api: ApiError = err.into();
    METRICS.inc_webhooks_rejected();
    emit_webhook_rejected(route, api.status().as_u16(), &api);
    api.into_response()
}
