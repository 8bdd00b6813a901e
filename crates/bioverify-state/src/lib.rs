//! BioVerify State: checkpoint persistence for durable workflows
//!
//! This crate is the persistence layer of the orchestrator. Every completed
//! workflow step is written here as an immutable checkpoint row, keyed by
//! workflow name, thread key and a dense sequence number.
//!
//! ## Key Components
//!
//! - `CheckpointStore`: backend-agnostic append/read trait
//! - `MemoryCheckpointStore`: in-memory fake for tests
//! - `SurrealCheckpointStore`: SurrealDB-backed store (`mem://`, `surrealkv://`, cloud)

mod config;
mod error;
pub mod fakes;
mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal_store;

pub use config::CloudConfig;
pub use error::{StateError, StorageError};
pub use storage_traits::{
    Checkpoint, CheckpointStatus, CheckpointStore, ContentDigest, StorageResult,
};
pub use surreal_store::SurrealCheckpointStore;

/// Result type for connection-level operations
pub type Result<T> = std::result::Result<T, StateError>;
