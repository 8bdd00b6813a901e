//! SurrealDB-backed CheckpointStore implementation
//!
//! Uses `schema::CheckpointRow` for persistence, converting to/from
//! `storage_traits::Checkpoint` at the boundary.

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::config::CloudConfig;
use crate::error::{StateError, StorageError};
use crate::migrations;
use crate::schema::{CheckpointRow, CountRow};
use crate::storage_traits::{Checkpoint, CheckpointStore, StorageResult};

/// Default on-disk location when no database is configured.
pub const DEFAULT_LOCAL_PATH: &str = ".bioverify/db";

/// SurrealDB-backed implementation of [`CheckpointStore`].
#[derive(Clone)]
pub struct SurrealCheckpointStore {
    db: Surreal<Any>,
}

impl SurrealCheckpointStore {
    /// Create an in-memory instance for testing.
    ///
    /// Connects to `mem://`, selects `bioverify/main`, and runs `init_schema`.
    pub async fn in_memory() -> crate::Result<Self> {
        Self::connect("mem://").await
    }

    /// Connect to any SurrealDB URL (`mem://`, `surrealkv://path`, `ws://...`)
    /// without authentication.
    pub async fn connect(url: &str) -> crate::Result<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StateError::Connection(format!("Failed to connect to {url}: {e}")))?;

        db.use_ns("bioverify")
            .use_db("main")
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        info!(url = %url, "SurrealCheckpointStore connected");
        Ok(Self { db })
    }

    /// Connect to SurrealDB Cloud with credentials.
    pub async fn connect_cloud(config: &CloudConfig) -> crate::Result<Self> {
        use surrealdb::opt::auth::{Database, Root};

        let db = surrealdb::engine::any::connect(&config.endpoint)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        if config.is_root {
            db.signin(Root {
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StateError::Connection(format!("Root auth failed: {e}")))?;
        } else {
            db.signin(Database {
                namespace: &config.namespace,
                database: &config.database,
                username: &config.username,
                password: &config.password,
            })
            .await
            .map_err(|e| StateError::Connection(format!("DB auth failed: {e}")))?;
        }

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .map_err(|e| StateError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        info!(endpoint = %config.endpoint, "SurrealCheckpointStore connected (cloud)");
        Ok(Self { db })
    }

    /// Create from environment variables.
    ///
    /// Resolution order: cloud credentials ([`CloudConfig::from_env`]), then
    /// `SURREALDB_URL`, then a local `surrealkv://` store under
    /// [`DEFAULT_LOCAL_PATH`].
    pub async fn from_env() -> crate::Result<Self> {
        if let Ok(config) = CloudConfig::from_env() {
            return Self::connect_cloud(&config).await;
        }

        if let Ok(url) = std::env::var("SURREALDB_URL") {
            return Self::connect(&url).await;
        }

        std::fs::create_dir_all(DEFAULT_LOCAL_PATH).map_err(|e| {
            StateError::Connection(format!(
                "Failed to create database directory {}: {}",
                DEFAULT_LOCAL_PATH, e
            ))
        })?;
        let url = format!("surrealkv://{}", DEFAULT_LOCAL_PATH);
        info!(
            "No cloud config or SURREALDB_URL found, using local persistence: {}",
            url
        );
        Self::connect(&url).await
    }

    async fn count(&self, workflow: &str, thread_key: &str) -> StorageResult<u64> {
        let mut res = self
            .db
            .query("SELECT count() AS total FROM checkpoints WHERE workflow = $wf AND thread_key = $key GROUP ALL")
            .bind(("wf", workflow.to_string()))
            .bind(("key", thread_key.to_string()))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        // GROUP ALL over no rows yields no row at all
        let rows: Vec<CountRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(rows.first().map_or(0, |r| r.total))
    }

    async fn rows(&self, workflow: &str, thread_key: &str) -> StorageResult<Vec<CheckpointRow>> {
        let mut res = self
            .db
            .query("SELECT * FROM checkpoints WHERE workflow = $wf AND thread_key = $key ORDER BY seq ASC")
            .bind(("wf", workflow.to_string()))
            .bind(("key", thread_key.to_string()))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        res.take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))
    }
}

#[async_trait]
impl CheckpointStore for SurrealCheckpointStore {
    async fn append(&self, checkpoint: Checkpoint) -> StorageResult<()> {
        let expected = self.count(&checkpoint.workflow, &checkpoint.thread_key).await?;
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

        debug!(
            workflow = %checkpoint.workflow,
            thread_key = %checkpoint.thread_key,
            seq = checkpoint.seq,
            "appending checkpoint"
        );

        let row = CheckpointRow::from(checkpoint);
        let _created: Option<CheckpointRow> = self
            .db
            .create("checkpoints")
            .content(row)
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(())
    }

    async fn latest(&self, workflow: &str, thread_key: &str) -> StorageResult<Option<Checkpoint>> {
        let mut res = self
            .db
            .query("SELECT * FROM checkpoints WHERE workflow = $wf AND thread_key = $key ORDER BY seq DESC LIMIT 1")
            .bind(("wf", workflow.to_string()))
            .bind(("key", thread_key.to_string()))
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let rows: Vec<CheckpointRow> = res
            .take(0)
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        rows.into_iter()
            .next()
            .map(CheckpointRow::into_checkpoint)
            .transpose()
    }

    async fn history(&self, workflow: &str, thread_key: &str) -> StorageResult<Vec<Checkpoint>> {
        self.rows(workflow, thread_key)
            .await?
            .into_iter()
            .map(CheckpointRow::into_checkpoint)
            .collect()
    }
}
