//! Storage trait definitions for BioVerify workflows
//!
//! A workflow's lifecycle is persisted as an append-only trail of
//! [`Checkpoint`] rows. The trail for one `(workflow, thread_key)` pair has
//! dense sequence numbers starting at 0; the newest row is the resume point
//! and older rows are kept for audit.
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// ContentDigest
// ---------------------------------------------------------------------------

/// Content digest (SHA-256 hex string).
///
/// The inner field is private to guarantee the string is always valid
/// lowercase hex produced by `from_bytes` or validated via `TryFrom<String>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest(hex::encode(hasher.finalize()))
    }

    /// Digest of a JSON value's compact serialization.
    pub fn of_json(value: &serde_json::Value) -> StorageResult<Self> {
        let bytes = serde_json::to_vec(value)?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Return the full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidDigest { digest: s });
        }
        Ok(ContentDigest(s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Checkpoint
// ---------------------------------------------------------------------------

/// Lifecycle status recorded on a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointStatus {
    /// A step completed and more steps remain.
    InProgress,
    /// A step suspended the run pending external input.
    Interrupted,
    /// The final step completed.
    Completed,
}

impl CheckpointStatus {
    /// Stable lowercase name, as stored by database backends.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Interrupted => "interrupted",
            Self::Completed => "completed",
        }
    }

    /// Whether no further steps will ever run for this thread.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::str::FromStr for CheckpointStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_progress" => Ok(Self::InProgress),
            "interrupted" => Ok(Self::Interrupted),
            "completed" => Ok(Self::Completed),
            other => Err(StorageError::Backend(format!(
                "unknown checkpoint status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for CheckpointStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Persisted snapshot of a workflow's state after one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Workflow name (e.g. "submission", "review").
    pub workflow: String,
    /// Deterministic thread key of the run.
    pub thread_key: String,
    /// Dense position in the trail, starting at 0.
    pub seq: u64,
    /// Index of the step to execute when the run continues.
    pub next_step: u32,
    /// Name of the step that produced this checkpoint.
    pub step_name: String,
    /// Lifecycle status after the step.
    pub status: CheckpointStatus,
    /// Serialized workflow state.
    pub state: serde_json::Value,
    /// Serialized interrupt, present when `status` is `Interrupted`.
    pub interrupt: Option<serde_json::Value>,
    /// SHA-256 of the serialized state.
    pub digest: ContentDigest,
    /// When the checkpoint was written.
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    /// Build a checkpoint, computing the state digest.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        workflow: impl Into<String>,
        thread_key: impl Into<String>,
        seq: u64,
        next_step: u32,
        step_name: impl Into<String>,
        status: CheckpointStatus,
        state: serde_json::Value,
        interrupt: Option<serde_json::Value>,
    ) -> StorageResult<Self> {
        let digest = ContentDigest::of_json(&state)?;
        Ok(Self {
            workflow: workflow.into(),
            thread_key: thread_key.into(),
            seq,
            next_step,
            step_name: step_name.into(),
            status,
            state,
            interrupt,
            digest,
            created_at: Utc::now(),
        })
    }

    /// Recompute the state digest and compare it with the stored one.
    pub fn verify_digest(&self) -> bool {
        ContentDigest::of_json(&self.state)
            .map(|d| d == self.digest)
            .unwrap_or(false)
    }
}

/// Append-only checkpoint store.
///
/// Guarantees:
/// - `append` accepts only `seq == history.len()`; an existing `seq` is a
///   `DuplicateCheckpoint`, a larger one a `SequenceGap`.
/// - Stored checkpoints are never modified or deleted.
/// - `history` returns the trail ordered by `seq`.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Append the next checkpoint of a thread's trail.
    async fn append(&self, checkpoint: Checkpoint) -> StorageResult<()>;

    /// The newest checkpoint for a thread, if any.
    async fn latest(&self, workflow: &str, thread_key: &str) -> StorageResult<Option<Checkpoint>>;

    /// The full trail for a thread, oldest first.
    async fn history(&self, workflow: &str, thread_key: &str) -> StorageResult<Vec<Checkpoint>>;
}
