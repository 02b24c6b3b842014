//! Schema definitions for Scrutineer SurrealDB tables
//!
//! Tables:
//! - memories: long-term memory entries written after each workflow run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::storage_traits::{ContentDigest, MemoryEntry, SessionId, StorageResult};

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

/// Memory record stored in SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// SurrealDB record ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<surrealdb::sql::Thing>,
    /// Application-level entry id (uuid)
    pub entry_id: String,
    /// Session the entry was taken from
    pub session_id: String,
    /// Run that triggered the write, if any
    pub run_id: Option<String>,
    /// Entry kind (`session_snapshot` | `run_outcome`)
    pub kind: String,
    /// Entry text
    pub content: String,
    /// SHA-256 of `content`
    pub content_digest: String,
    /// Created timestamp
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Convert a domain entry into a DB row.
    pub fn from_entry(entry: MemoryEntry) -> Self {
        MemoryRecord {
            id: None,
            entry_id: entry.id,
            session_id: entry.session_id.to_string(),
            run_id: entry.run_id,
            kind: entry.kind.to_string(),
            content: entry.content,
            content_digest: entry.content_digest.to_string(),
            created_at: entry.created_at,
        }
    }

    /// Convert a DB row back into a domain entry, validating every field.
    pub fn into_entry(self) -> StorageResult<MemoryEntry> {
        Ok(MemoryEntry {
            id: self.entry_id,
            session_id: SessionId::new(self.session_id)?,
            run_id: self.run_id,
            kind: self.kind.parse()?,
            content_digest: ContentDigest::try_from(self.content_digest)?,
            content: self.content,
            created_at: self.created_at,
        })
        .and_then(|entry| {
            if entry.verify_integrity() {
                Ok(entry)
            } else {
                Err(StorageError::Backend(format!(
                    "memory entry {} failed digest check",
                    entry.id
                )))
            }
        })
    }
}
