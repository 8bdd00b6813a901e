//! Shared HTTP client construction and response checks.

use std::time::Duration;

use bioverify_core::{AdapterError, BioVerifyError};
use serde::de::DeserializeOwned;

const USER_AGENT: &str = concat!("bioverify/", env!("CARGO_PKG_VERSION"));

/// Build a client with the given per-request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, BioVerifyError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| BioVerifyError::Configuration(format!("failed to build HTTP client: {e}")))
}

pub(crate) fn transport(target: &str, err: reqwest::Error) -> AdapterError {
    AdapterError::Transport {
        target: target.to_string(),
        message: err.to_string(),
    }
}

/// Reject non-2xx responses.
pub(crate) fn ensure_success(target: &str, response: reqwest::Response) -> Result<reqwest::Response, AdapterError> {
    let status = response.status();
    if !status.is_success() {
        return Err(AdapterError::Http {
            target: target.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response)
}

pub(crate) async fn json_body<T: DeserializeOwned>(target: &str, response: reqwest::Response) -> Result<T, AdapterError> {
    response.json::<T>().await.map_err(|e| AdapterError::Decode {
        target: target.to_string(),
        message: e.to_string(),
    })
}
