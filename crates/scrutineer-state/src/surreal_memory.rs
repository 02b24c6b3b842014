//! SurrealDB-backed MemoryService implementation
//!
//! Uses `schema::MemoryRecord` for persistence, converting to/from
//! `storage_traits::MemoryEntry` at the boundary.

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::migrations;
use crate::schema::MemoryRecord;
use crate::storage_traits::{MemoryEntry, MemoryQuery, MemoryService, StorageResult};

/// Namespace all Scrutineer data lives in.
pub const NAMESPACE: &str = "scrutineer";
/// Database holding long-term memory.
pub const DATABASE: &str = "memory";

/// SurrealDB-backed implementation of [`MemoryService`].
pub struct SurrealMemoryService {
    db: Surreal<Any>,
}

impl SurrealMemoryService {
    /// Create an in-memory instance (`mem://`).
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect("mem://").await
    }

    /// Connect to any SurrealDB endpoint (`mem://`, `surrealkv://<path>`, `ws://...`).
    ///
    /// For `surrealkv://` the directory is created first.
    pub async fn connect(url: &str) -> StorageResult<Self> {
        if let Some(path) = url.strip_prefix("surrealkv://") {
            std::fs::create_dir_all(path)?;
        }

        let db = surrealdb::engine::any::connect(url).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        migrations::init_schema(&db).await?;

        info!(url = %url, "SurrealMemoryService connected");
        Ok(Self { db })
    }
}

#[async_trait]
impl MemoryService for SurrealMemoryService {
    async fn add_session_to_memory(&self, entry: MemoryEntry) -> StorageResult<()> {
        debug!(
            entry_id = %entry.id,
            session_id = %entry.session_id,
            kind = %entry.kind,
            "writing memory entry"
        );

        let row = MemoryRecord::from_entry(entry);
        let _created: Option<MemoryRecord> = self.db.create("memories").content(row).await?;
        Ok(())
    }

    async fn search(&self, query: &MemoryQuery) -> StorageResult<Vec<MemoryEntry>> {
        let sql = search_sql(query);
        debug!(sql = %sql, "searching memory");

        let mut request = self.db.query(sql);
        if let Some(ref sid) = query.session_id {
            request = request.bind(("sid", sid.to_string()));
        }
        if let Some(kind) = query.kind {
            request = request.bind(("kind", kind.to_string()));
        }
        let mut res = request.await?;
        let rows: Vec<MemoryRecord> = res.take(0)?;

        let entries = rows
            .into_iter()
            .map(MemoryRecord::into_entry)
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(query.apply(entries))
    }
}

/// SurrealQL for a memory query. Session, kind and ordering are pushed to
/// the database; term matching stays client-side, so `LIMIT` is only pushed
/// down when there is no text filter.
fn search_sql(query: &MemoryQuery) -> String {
    let mut conditions = Vec::new();
    if query.session_id.is_some() {
        conditions.push("session_id = $sid");
    }
    if query.kind.is_some() {
        conditions.push("kind = $kind");
    }

    let mut sql = String::from("SELECT * FROM memories");
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC");

    let has_text = query.text.as_deref().is_some_and(|t| !t.trim().is_empty());
    if let (Some(limit), false) = (query.limit, has_text) {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_traits::{MemoryEntryKind, SessionId};

    #[tokio::test]
    async fn write_then_search() {
        let svc = SurrealMemoryService::in_memory().await.unwrap();
        let sid = SessionId::new("garage").unwrap();
        svc.add_session_to_memory(MemoryEntry::new(
            sid.clone(),
            Some("run-1".to_string()),
            MemoryEntryKind::RunOutcome,
            "committed: fit 20mm restrictor",
        ))
        .await
        .unwrap();

        let hits = svc
            .search(&MemoryQuery::all().with_text("restrictor"))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].session_id, sid);
        assert_eq!(hits[0].run_id.as_deref(), Some("run-1"));
    }

    #[test]
    fn filters_are_pushed_into_the_query() {
        assert_eq!(
            search_sql(&MemoryQuery::all()),
            "SELECT * FROM memories ORDER BY created_at DESC"
        );

        let scoped = MemoryQuery::all()
            .for_session(SessionId::new("garage").unwrap())
            .with_kind(MemoryEntryKind::RunOutcome)
            .with_limit(5);
        assert_eq!(
            search_sql(&scoped),
            "SELECT * FROM memories WHERE session_id = $sid AND kind = $kind \
             ORDER BY created_at DESC LIMIT 5"
        );

        // Term matching happens after the fetch, so the limit cannot be pushed.
        let texty = MemoryQuery::all().with_text("restrictor").with_limit(5);
        assert!(!search_sql(&texty).contains("LIMIT"));
        let blank = MemoryQuery::all().with_text("  ").with_limit(5);
        assert!(search_sql(&blank).ends_with("LIMIT 5"));
    }

    #[tokio::test]
    async fn kind_and_limit_filter_in_database() {
        let svc = SurrealMemoryService::in_memory().await.unwrap();
        let garage = SessionId::new("garage").unwrap();
        let pits = SessionId::new("pits").unwrap();
        for (sid, kind, text) in [
            (&garage, MemoryEntryKind::RunOutcome, "committed: wing"),
            (&garage, MemoryEntryKind::SessionSnapshot, "1. wing"),
            (&garage, MemoryEntryKind::RunOutcome, "committed: floor"),
            (&pits, MemoryEntryKind::RunOutcome, "committed: tyres"),
        ] {
            svc.add_session_to_memory(MemoryEntry::new(sid.clone(), None, kind, text))
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let outcomes = svc
            .search(
                &MemoryQuery::all()
                    .for_session(garage.clone())
                    .with_kind(MemoryEntryKind::RunOutcome),
            )
            .await
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|e| e.kind == MemoryEntryKind::RunOutcome));

        let newest = svc
            .search(&MemoryQuery::all().for_session(garage).with_limit(1))
            .await
            .unwrap();
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].content, "committed: floor");
    }
}
