//! Database row types for the SurrealDB backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage_traits::{Checkpoint, ContentDigest, StorageResult};

/// Module for serializing chrono DateTime to SurrealDB datetime format
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let sd = SurrealDatetime::from(*date);
        serde::Serialize::serialize(&sd, serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Row stored in the `checkpoints` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointRow {
    /// SurrealDB record ID
    pub id: Option<surrealdb::sql::Thing>,
    pub workflow: String,
    pub thread_key: String,
    pub seq: u64,
    pub next_step: u32,
    pub step_name: String,
    /// "in_progress" | "interrupted" | "completed"
    pub status: String,
    pub state: serde_json::Value,
    #[serde(default)]
    pub interrupt: Option<serde_json::Value>,
    pub digest: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl From<Checkpoint> for CheckpointRow {
    fn from(cp: Checkpoint) -> Self {
        CheckpointRow {
            id: None,
            workflow: cp.workflow,
            thread_key: cp.thread_key,
            seq: cp.seq,
            next_step: cp.next_step,
            step_name: cp.step_name,
            status: cp.status.as_str().to_string(),
            state: cp.state,
            interrupt: cp.interrupt,
            digest: cp.digest.as_str().to_string(),
            created_at: cp.created_at,
        }
    }
}

impl CheckpointRow {
    /// Convert a DB row back into the storage-level checkpoint.
    pub fn into_checkpoint(self) -> StorageResult<Checkpoint> {
        Ok(Checkpoint {
            workflow: self.workflow,
            thread_key: self.thread_key,
            seq: self.seq,
            next_step: self.next_step,
            step_name: self.step_name,
            status: self.status.parse()?,
            state: self.state,
            interrupt: self.interrupt,
            digest: ContentDigest::try_from(self.digest)?,
            created_at: self.created_at,
        })
    }
}

/// Result row of a `count() ... GROUP ALL` query.
#[derive(Debug, Deserialize)]
pub struct CountRow {
    pub total: u64,
}
