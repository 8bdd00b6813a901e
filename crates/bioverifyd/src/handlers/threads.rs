//! Checkpoint inspection for operators.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use bioverify_core::{Checkpoint, ThreadKey, REVIEW_WORKFLOW, SUBMISSION_WORKFLOW};

use super::auth::require_operator;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Latest checkpoint of a thread.
pub async fn thread_status(
    State(state): State<AppState>,
    Path((workflow, thread_key)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Json<Checkpoint>> {
    require_operator(&state, &headers)?;
    let key = ThreadKey::parse(&thread_key)?;

    let latest = match workflow.as_str() {
        SUBMISSION_WORKFLOW => state.engines.submission.latest(&key).await?,
        REVIEW_WORKFLOW => state.engines.review.latest(&key).await?,
        other => return Err(ApiError::NotFound(format!("unknown workflow {other}"))),
    };
    latest
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no checkpoint for {workflow}/{key}")))
}

/// Full checkpoint trail of a thread, oldest first.
pub async fn thread_history(
    State(state): State<AppState>,
    Path((workflow, thread_key)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult<Json<Vec<Checkpoint>>> {
    require_operator(&state, &headers)?;
    let key = ThreadKey::parse(&thread_key)?;

    let history = match workflow.as_str() {
        SUBMISSION_WORKFLOW => state.engines.submission.history(&key).await?,
        REVIEW_WORKFLOW => state.engines.review.history(&key).await?,
        other => return Err(ApiError::NotFound(format!("unknown workflow {other}"))),
    };
    if history.is_empty() {
        return Err(ApiError::NotFound(format!("no checkpoint for {workflow}/{key}")));
    }
    Ok(Json(history))
}
