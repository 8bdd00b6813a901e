//! Error types for bioverify-state

use thiserror::Error;

/// Errors raised while connecting to or preparing the database.
#[derive(Error, Debug)]
pub enum StateError {
    /// Database connection error
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Database query error
    #[error("Database query failed: {0}")]
    Query(String),

    /// Schema setup error
    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),
}

impl From<surrealdb::Error> for StateError {
    fn from(err: surrealdb::Error) -> Self {
        StateError::Query(err.to_string())
    }
}

/// Errors returned by [`crate::CheckpointStore`] implementations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend failed to execute a read or write.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A checkpoint with this sequence number already exists.
    #[error("checkpoint {seq} already exists for {workflow}/{thread_key}")]
    DuplicateCheckpoint {
        workflow: String,
        thread_key: String,
        seq: u64,
    },

    /// The appended sequence number skips ahead of the stored trail.
    #[error("checkpoint sequence gap for {workflow}/{thread_key}: expected {expected}, got {got}")]
    SequenceGap {
        workflow: String,
        thread_key: String,
        expected: u64,
        got: u64,
    },

    /// A stored digest is not valid SHA-256 hex.
    #[error("invalid content digest: {digest}")]
    InvalidDigest { digest: String },

    /// State could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

impl From<StateError> for StorageError {
    fn from(err: StateError) -> Self {
        StorageError::Backend(err.to_string())
    }
}
