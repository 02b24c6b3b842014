//! Explicit per-session state threaded through every run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scrutineer_state::{SessionId, SessionStore};

use crate::domain::Result;
use crate::hitl::ConfirmationRequest;
use crate::ledger::TaskLedger;
use crate::workflow::WorkflowState;

/// A run parked at the confirmation gate, with everything needed to resume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspendedRun {
    pub run_id: Uuid,
    pub request: ConfirmationRequest,
    /// States visited so far; the last one is always `AWAITING_CONFIRMATION`.
    pub trail: Vec<WorkflowState>,
    pub suspended_at: DateTime<Utc>,
}

/// Ledger plus suspended runs for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: SessionId,
    /// Persisted under the `tasks` key.
    pub tasks: TaskLedger,
    #[serde(default)]
    pub pending: BTreeMap<Uuid, SuspendedRun>,
    pub updated_at: DateTime<Utc>,
    /// Store revision this state was loaded at; 0 until first saved.
    #[serde(default)]
    pub revision: u64,
}

impl SessionState {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            tasks: TaskLedger::new(),
            pending: BTreeMap::new(),
            updated_at: Utc::now(),
            revision: 0,
        }
    }

    /// Append to the ledger and return the acknowledgement.
    pub fn append(&mut self, task: impl Into<String>) -> String {
        self.updated_at = Utc::now();
        self.tasks.append(task)
    }

    /// Committed tasks in insertion order.
    pub fn list(&self) -> &[String] {
        self.tasks.list()
    }

    pub fn suspend(&mut self, run: SuspendedRun) {
        self.updated_at = Utc::now();
        self.pending.insert(run.run_id, run);
    }

    pub fn pending_run(&self, run_id: &Uuid) -> Option<&SuspendedRun> {
        self.pending.get(run_id)
    }

    /// Remove a suspended run once it has been resolved.
    pub fn resolve(&mut self, run_id: &Uuid) -> Option<SuspendedRun> {
        self.updated_at = Utc::now();
        self.pending.remove(run_id)
    }

    /// Suspended runs, oldest first.
    pub fn pending_runs(&self) -> Vec<&SuspendedRun> {
        let mut runs: Vec<_> = self.pending.values().collect();
        runs.sort_by_key(|r| r.suspended_at);
        runs
    }

    /// Plain-text snapshot written to long-term memory.
    pub fn snapshot_text(&self) -> String {
        let mut out = format!("Session {} tasks:", self.session_id);
        if self.tasks.is_empty() {
            out.push_str(" (none)");
        }
        for (i, task) in self.list().iter().enumerate() {
            out.push_str(&format!("\n{}. {}", i + 1, task));
        }
        for run in self.pending_runs() {
            out.push_str(&format!("\nPending: {}", run.request.hint()));
        }
        out
    }

    /// Load a session from the store, or start a fresh one.
    pub async fn load(store: &dyn SessionStore, session_id: &SessionId) -> Result<Self> {
        match store.load(session_id).await? {
            Some(doc) => Ok(serde_json::from_value(doc)?),
            None => Ok(Self::new(session_id.clone())),
        }
    }

    /// Write the whole session back to the store.
    ///
    /// Fails with a storage conflict if another writer saved this session
    /// after it was loaded; reload and retry in that case.
    pub async fn save(&mut self, store: &dyn SessionStore) -> Result<()> {
        let doc = serde_json::to_value(&*self)?;
        self.revision = store.save(&self.session_id, &doc, self.revision).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WorkflowError;
    use scrutineer_state::fakes::MemorySessionStore;
    use scrutineer_state::StorageError;

    fn sid() -> SessionId {
        SessionId::new("garage").unwrap()
    }

    #[test]
    fn test_tasks_key_is_plain_list() {
        let mut s = SessionState::new(sid());
        s.append("Fit a 20mm restrictor");
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["tasks"], serde_json::json!(["Fit a 20mm restrictor"]));
    }

    #[tokio::test]
    async fn test_load_missing_session_starts_empty() {
        let store = MemorySessionStore::new();
        let s = SessionState::load(&store, &sid()).await.unwrap();
        assert!(s.list().is_empty());
        assert!(s.pending.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemorySessionStore::new();
        let mut s = SessionState::new(sid());
        s.append("a");
        s.append("b");
        s.save(&store).await.unwrap();
        assert_eq!(s.revision, 1);

        let back = SessionState::load(&store, &sid()).await.unwrap();
        assert_eq!(back, s);
    }

    #[tokio::test]
    async fn test_stale_save_is_a_conflict() {
        let store = MemorySessionStore::new();
        let mut first = SessionState::load(&store, &sid()).await.unwrap();
        let mut second = SessionState::load(&store, &sid()).await.unwrap();

        first.append("Fit scatter shields");
        first.save(&store).await.unwrap();
        second.append("Fit a firewall");
        let err = second.save(&store).await.unwrap_err();

        assert!(matches!(
            err,
            WorkflowError::Session(StorageError::Conflict { expected: 0, found: 1, .. })
        ));
        let back = SessionState::load(&store, &sid()).await.unwrap();
        assert_eq!(back.list(), ["Fit scatter shields"]);
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_document() {
        let store = MemorySessionStore::new();
        store
            .save(&sid(), &serde_json::json!({ "tasks": 42 }), 0)
            .await
            .unwrap();
        assert!(SessionState::load(&store, &sid()).await.is_err());
    }

    #[test]
    fn test_snapshot_text() {
        let mut s = SessionState::new(sid());
        assert!(s.snapshot_text().ends_with("(none)"));
        s.append("Fit scatter shields");
        assert!(s.snapshot_text().contains("1. Fit scatter shields"));
    }
}
