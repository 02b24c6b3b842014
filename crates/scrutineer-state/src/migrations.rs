//! SurrealDB schema initialization
//!
//! Sets up the `memories` table with its indexes. Safe to call on every
//! connection (idempotent).

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::storage_traits::StorageResult;

/// Initialize all Scrutineer tables in SurrealDB
pub async fn init_schema(db: &Surreal<Any>) -> StorageResult<()> {
    info!("Initializing Scrutineer SurrealDB schema");
    init_memories_table(db).await?;
    Ok(())
}

/// Initialize `memories` table
///
/// Schema:
/// ```text
/// TABLE memories {
///   entry_id:        STRING (unique)
///   session_id:      STRING (indexed)
///   run_id:          STRING?
///   kind:            STRING (session_snapshot | run_outcome)
///   content:         STRING
///   content_digest:  STRING
///   created_at:      DATETIME (indexed)
/// }
/// ```
///
/// Entries are append-only.
async fn init_memories_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("Initializing memories table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS memories AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_memory_entry_id ON TABLE memories COLUMNS entry_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_memory_session ON TABLE memories COLUMNS session_id;
        DEFINE INDEX IF NOT EXISTS idx_memory_created_at ON TABLE memories COLUMNS created_at;
    "#;

    db.query(sql).await?.check()?;
    debug!("memories table initialized");
    Ok(())
}
