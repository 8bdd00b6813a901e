//! Operator bearer-token check.

use axum::http::{header, HeaderMap};
use subtle::ConstantTimeEq;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Require `Authorization: Bearer <operator token>`.
///
/// An unset token fails closed with a server error.
pub(crate) fn require_operator(state: &AppState, headers: &HeaderMap) -> ApiResult<()> {
    let Some(expected) = state.operator_token.as_deref() else {
        return Err(ApiError::NotConfigured("operator token is not set".into()));
    };
    check_bearer(headers, expected)
}

fn check_bearer(headers: &HeaderMap, expected: &str) -> ApiResult<()> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".into()))?;

    if !bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        return Err(ApiError::Unauthorized("invalid bearer token".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_matching_token_is_accepted() {
        assert!(check_bearer(&bearer("Bearer op-token"), "op-token").is_ok());
    }

    #[test]
    fn test_wrong_or_truncated_token_is_unauthorized() {
        for value in ["Bearer op-tokem", "Bearer op", "Bearer op-token-extra"] {
            let err = check_bearer(&bearer(value), "op-token").unwrap_err();
            assert!(matches!(err, ApiError::Unauthorized(_)), "{value}");
        }
    }

    #[test]
    fn test_missing_or_non_bearer_header_is_unauthorized() {
        assert!(matches!(
            check_bearer(&HeaderMap::new(), "op-token"),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            check_bearer(&bearer("Basic op-token"), "op-token"),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
