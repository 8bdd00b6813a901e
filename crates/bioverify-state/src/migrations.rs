//! SurrealDB schema migrations and initialization

use crate::Result;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

/// Initialize all BioVerify tables in SurrealDB
///
/// Safe to call multiple times (idempotent).
pub async fn init_schema(db: &Surreal<Any>) -> Result<()> {
    info!("Initializing BioVerify SurrealDB schema");
    init_checkpoints_table(db).await?;
    Ok(())
}

/// Initialize `checkpoints` table with constraints and indexes
///
/// Schema:
/// ```text
/// TABLE checkpoints {
///   workflow:    STRING
///   thread_key:  STRING
///   seq:         INT (dense, from 0, per workflow + thread_key)
///   next_step:   INT
///   step_name:   STRING
///   status:      STRING (in_progress | interrupted | completed)
///   state:       OBJECT
///   interrupt:   OBJECT?
///   digest:      STRING (SHA-256 of state)
///   created_at:  DATETIME
/// }
/// ```
///
/// Rows are append-only: updates and deletes are not permitted.
async fn init_checkpoints_table(db: &Surreal<Any>) -> Result<()> {
    debug!("Initializing checkpoints table");

    let sql = r#"
        DEFINE TABLE checkpoints AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update NONE
                FOR delete NONE;

        -- One row per trail position
        DEFINE INDEX idx_workflow_thread_seq ON TABLE checkpoints COLUMNS workflow, thread_key, seq UNIQUE;

        -- Latest-checkpoint lookups
        DEFINE INDEX idx_workflow_thread ON TABLE checkpoints COLUMNS workflow, thread_key;

        -- Operator queries by status
        DEFINE INDEX idx_status ON TABLE checkpoints COLUMNS status;
    "#;

    db.query(sql).await?;

    info!("✓ checkpoints table initialized");
    Ok(())
}
