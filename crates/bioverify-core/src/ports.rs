//! Capability interfaces consumed by the workflows.
//!
//! Production implementations live in `bioverify-adapters`; tests supply
//! recording doubles. Every adapter must tolerate concurrent use from
//! independent runs and enforce its own request timeout.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Address, EvidenceSource};
use crate::error::AdapterError;
use crate::settlement::SettlementActions;

/// Content-addressed fetch: `GET {gateway}/{cid}`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, cid: &str) -> Result<Vec<u8>, AdapterError>;
}

/// Depth of a forensic web search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

/// A literal-match web search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub depth: SearchDepth,
    pub max_results: u8,
}

#[async_trait]
pub trait EvidenceSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<EvidenceSource>, AdapterError>;
}

/// Input to a structured-verdict model call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerdictRequest {
    pub system_instructions: String,
    pub abstract_text: String,
    /// The evidence list serialized as JSON.
    pub evidence_json: String,
}

/// Model returning `{decision, reason}` as raw JSON.
///
/// Output is validated by the caller, so implementations should return what
/// the model produced rather than coercing it.
#[async_trait]
pub trait StructuredVerdict: Send + Sync {
    async fn judge(&self, request: &VerdictRequest) -> Result<serde_json::Value, AdapterError>;
}

/// A contract call prepared for simulation or submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCall {
    /// Account the call is made from.
    pub from: Address,
    /// Contract address.
    pub to: Address,
    /// ABI-encoded calldata.
    pub data: Vec<u8>,
}

/// Chain read/write for one network.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Execute the call without committing it; returns the raw return data.
    async fn simulate(&self, call: &ContractCall) -> Result<Vec<u8>, AdapterError>;

    /// Sign and broadcast the call through the provided signing capability;
    /// returns the transaction hash.
    async fn submit(&self, call: &ContractCall) -> Result<String, AdapterError>;
}

/// Failure to deliver a notification. Never propagated past the caller.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification endpoint responded with HTTP {0}")]
    Http(u16),

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

/// Chat notification channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotificationError>;
}

/// Notifier that discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _message: &str) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// The capabilities both workflows are built from.
#[derive(Clone)]
pub struct Capabilities {
    pub content: Arc<dyn ContentStore>,
    pub search: Arc<dyn EvidenceSearch>,
    pub verdict: Arc<dyn StructuredVerdict>,
    pub settlement: Arc<dyn SettlementActions>,
}
