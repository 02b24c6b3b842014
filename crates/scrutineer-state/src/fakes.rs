//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemorySessionStore`, `InMemoryMemoryService` and
//! `FailingMemoryService` that satisfy the trait contracts without any
//! external dependencies.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemorySessionStore
// ---------------------------------------------------------------------------

/// In-memory session store backed by a `BTreeMap<SessionId, document>`.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    docs: Mutex<BTreeMap<SessionId, serde_json::Value>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session: &SessionId) -> StorageResult<Option<serde_json::Value>> {
        let docs = self.docs.lock().unwrap();
        Ok(docs.get(session).cloned())
    }

    async fn save(
        &self,
        session: &SessionId,
        document: &serde_json::Value,
        expected_revision: u64,
    ) -> StorageResult<u64> {
        let mut docs = self.docs.lock().unwrap();
        let found = docs.get(session).map(document_revision).unwrap_or(0);
        if found != expected_revision {
            return Err(StorageError::Conflict {
                session_id: session.to_string(),
                expected: expected_revision,
                found,
            });
        }
        let revision = expected_revision + 1;
        docs.insert(session.clone(), with_revision(session, document, revision)?);
        Ok(revision)
    }

    async fn list_sessions(&self) -> StorageResult<Vec<SessionId>> {
        let docs = self.docs.lock().unwrap();
        Ok(docs.keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// InMemoryMemoryService
// ---------------------------------------------------------------------------

/// In-memory long-term memory backed by a `Vec<MemoryEntry>`.
#[derive(Debug, Default)]
pub struct InMemoryMemoryService {
    entries: Mutex<Vec<MemoryEntry>>,
}

impl InMemoryMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MemoryService for InMemoryMemoryService {
    async fn add_session_to_memory(&self, entry: MemoryEntry) -> StorageResult<()> {
        let mut entries = self.entries.lock().unwrap();
        entries.push(entry);
        Ok(())
    }

    async fn search(&self, query: &MemoryQuery) -> StorageResult<Vec<MemoryEntry>> {
        let entries = self.entries.lock().unwrap();
        Ok(query.apply(entries.iter().cloned()))
    }
}

// ---------------------------------------------------------------------------
// FailingMemoryService
// ---------------------------------------------------------------------------

/// Memory service whose every call fails with a backend error.
///
/// Counts attempted writes so tests can assert a write was tried.
#[derive(Debug, Default)]
pub struct FailingMemoryService {
    attempts: Mutex<usize>,
}

impl FailingMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `add_session_to_memory` calls seen so far.
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl MemoryService for FailingMemoryService {
    async fn add_session_to_memory(&self, _entry: MemoryEntry) -> StorageResult<()> {
        *self.attempts.lock().unwrap() += 1;
        Err(StorageError::Backend("memory service unavailable".to_string()))
    }

    async fn search(&self, _query: &MemoryQuery) -> StorageResult<Vec<MemoryEntry>> {
        Err(StorageError::Backend("memory service unavailable".to_string()))
    }
}
