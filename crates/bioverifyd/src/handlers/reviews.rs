//! Vote delivery for suspended reviews and retry of failed ones.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use bioverify_core::{CastVote, ReviewResume, ThreadKey, REVIEW_WORKFLOW};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::auth::require_operator;
use crate::error::{ApiError, ApiResult};
use crate::runs::{spawn_review_resume, spawn_review_retry};
use crate::state::AppState;

/// Human reviewer votes
#[derive(Debug, Deserialize)]
pub struct CastVotesRequest {
    pub votes: Vec<CastVote>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAccepted {
    pub status: &'static str,
    pub thread_key: String,
}

/// Resume a review waiting on `REVIEW_PUBLICATION`.
pub async fn cast_votes(
    State(state): State<AppState>,
    Path(thread_key): Path<String>,
    headers: HeaderMap,
    body: Result<Json<CastVotesRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ResumeAccepted>)> {
    require_operator(&state, &headers)?;
    let Json(request) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    if request.votes.is_empty() {
        return Err(ApiError::Validation("votes must not be empty".into()));
    }
    accept_resume(state, &thread_key, ReviewResume::Votes(request.votes)).await
}

/// Resume a review waiting on `SENIOR_REVIEW_PUBLICATION`.
pub async fn senior_review(
    State(state): State<AppState>,
    Path(thread_key): Path<String>,
    headers: HeaderMap,
    body: Result<Json<CastVote>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ResumeAccepted>)> {
    require_operator(&state, &headers)?;
    let Json(vote) = body.map_err(|e| ApiError::Validation(e.body_text()))?;
    accept_resume(state, &thread_key, ReviewResume::SeniorVote(vote)).await
}

/// Re-run the failed step of a review left in progress.
pub async fn retry_review(
    State(state): State<AppState>,
    Path(thread_key): Path<String>,
    headers: HeaderMap,
) -> ApiResult<(StatusCode, Json<ResumeAccepted>)> {
    require_operator(&state, &headers)?;
    let key = ThreadKey::parse(&thread_key)?;
    let guard = state
        .inflight
        .try_acquire(REVIEW_WORKFLOW, &key)
        .ok_or_else(|| ApiError::Conflict(format!("review {key} is already running")))?;

    state.engines.review.check_retry(&key).await?;

    info!(thread_key = %key, "retry accepted");
    spawn_review_retry(state.engines.clone(), guard, key.clone());

    Ok((
        StatusCode::ACCEPTED,
        Json(ResumeAccepted {
            status: "accepted",
            thread_key: key.to_string(),
        }),
    ))
}

/// Validate synchronously, then resume in the background.
async fn accept_resume(
    state: AppState,
    thread_key: &str,
    input: ReviewResume,
) -> ApiResult<(StatusCode, Json<ResumeAccepted>)> {
    let key = ThreadKey::parse(thread_key)?;
    let guard = state
        .inflight
        .try_acquire(REVIEW_WORKFLOW, &key)
        .ok_or_else(|| ApiError::Conflict(format!("review {key} is already running")))?;

    state.engines.review.check_resume(&key, input.clone()).await?;

    info!(thread_key = %key, expects = %input.expected_interrupt(), "resume accepted");
    spawn_review_resume(state.engines.clone(), guard, key.clone(), input);

    Ok((
        StatusCode::ACCEPTED,
        Json(ResumeAccepted {
            status: "accepted",
            thread_key: key.to_string(),
        }),
    ))
}
