//! Error types for the workflow engine.

use bioverify_state::{CheckpointStatus, StorageError};

use super::interrupt::InterruptKind;
use crate::error::BioVerifyError;

/// Errors produced while running or resuming a workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("no checkpoint for {workflow}/{thread_key}")]
    ThreadNotFound {
        workflow: String,
        thread_key: String,
    },

    #[error("{workflow}/{thread_key} is {status}, not interrupted")]
    NotInterrupted {
        workflow: String,
        thread_key: String,
        status: CheckpointStatus,
    },

    #[error("{workflow}/{thread_key} is {status}, nothing to retry")]
    NotRetryable {
        workflow: String,
        thread_key: String,
        status: CheckpointStatus,
    },

    #[error("thread is waiting for {found}, not {expected}")]
    WrongInterrupt {
        expected: InterruptKind,
        found: InterruptKind,
    },

    /// Resume input was rejected; nothing was written.
    #[error("invalid resume input: {0}")]
    InvalidResume(String),

    #[error("step {step} failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: BioVerifyError,
    },

    #[error("checkpoint storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("checkpointed state could not be encoded or decoded: {0}")]
    StateCodec(#[from] serde_json::Error),
}

/// Result type for engine operations.
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;
