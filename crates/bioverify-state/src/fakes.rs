//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryCheckpointStore`, which satisfies the `CheckpointStore`
//! contract without any external dependencies.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

/// In-memory checkpoint store backed by a `HashMap<(workflow, key), trail>`.
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    trails: Mutex<HashMap<(String, String), Vec<Checkpoint>>>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<(String, String), Vec<Checkpoint>>>> {
        self.trails
            .lock()
            .map_err(|e| StorageError::Backend(format!("checkpoint store poisoned: {e}")))
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn append(&self, checkpoint: Checkpoint) -> StorageResult<()> {
        let mut trails = self.lock()?;
        let trail = trails
            .entry((checkpoint.workflow.clone(), checkpoint.thread_key.clone()))
            .or_default();

        let expected = trail.len() as u64;
        if checkpoint.seq < expected {
            return Err(StorageError::DuplicateCheckpoint {
                workflow: checkpoint.workflow,
                thread_key: checkpoint.thread_key,
                seq: checkpoint.seq,
            });
        }
        if checkpoint.seq > expected {
            return Err(StorageError::SequenceGap {
                workflow: checkpoint.workflow,
                thread_key: checkpoint.thread_key,
                expected,
                got: checkpoint.seq,
            });
        }

        trail.push(checkpoint);
        Ok(())
    }

    async fn latest(&self, workflow: &str, thread_key: &str) -> StorageResult<Option<Checkpoint>> {
        let trails = self.lock()?;
        Ok(trails
            .get(&(workflow.to_string(), thread_key.to_string()))
            .and_then(|trail| trail.last().cloned()))
    }

    async fn history(&self, workflow: &str, thread_key: &str) -> StorageResult<Vec<Checkpoint>> {
        let trails = self.lock()?;
        Ok(trails
            .get(&(workflow.to_string(), thread_key.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
