use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::StorageError;
use crate::storage_traits::{
    document_revision, with_revision, SessionId, SessionStore, StorageResult,
};

/// Filesystem-backed session store.
///
/// Layout: `<root>/sessions/<session id>.json`, one pretty-printed JSON
/// document per session. Saves hold an exclusive advisory lock on
/// `<session id>.lock` while they compare revisions and swap the file in, so
/// concurrent processes cannot overwrite each other's commits.
pub struct FsSessionStore {
    sessions_dir: PathBuf,
}

impl FsSessionStore {
    /// Create a new `FsSessionStore` rooted at `root`. Creates `root/sessions/` if needed.
    pub fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let sessions_dir = root.as_ref().join("sessions");
        fs::create_dir_all(&sessions_dir)?;
        Ok(Self { sessions_dir })
    }

    fn document_path(&self, session: &SessionId) -> PathBuf {
        self.sessions_dir.join(format!("{}.json", session.as_str()))
    }

    fn lock_path(&self, session: &SessionId) -> PathBuf {
        self.sessions_dir.join(format!("{}.lock", session.as_str()))
    }

    fn read_document(&self, session: &SessionId) -> StorageResult<Option<serde_json::Value>> {
        let path = self.document_path(session);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let doc = serde_json::from_slice(&bytes).map_err(|e| StorageError::CorruptDocument {
            session_id: session.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(doc))
    }
}

#[async_trait]
impl SessionStore for FsSessionStore {
    async fn load(&self, session: &SessionId) -> StorageResult<Option<serde_json::Value>> {
        self.read_document(session)
    }

    async fn save(
        &self,
        session: &SessionId,
        document: &serde_json::Value,
        expected_revision: u64,
    ) -> StorageResult<u64> {
        let revision = expected_revision + 1;
        let bytes = serde_json::to_vec_pretty(&with_revision(session, document, revision)?)?;

        // Released when `lock` is dropped.
        let lock = File::create(self.lock_path(session))?;
        lock.lock_exclusive()?;

        let found = self
            .read_document(session)?
            .as_ref()
            .map(document_revision)
            .unwrap_or(0);
        if found != expected_revision {
            return Err(StorageError::Conflict {
                session_id: session.to_string(),
                expected: expected_revision,
                found,
            });
        }

        // Atomic write: write to temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.sessions_dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(self.document_path(session))
            .map_err(|e| e.error)?;

        debug!(session_id = %session, revision, bytes = bytes.len(), "session saved");
        Ok(revision)
    }

    async fn list_sessions(&self) -> StorageResult<Vec<SessionId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.sessions_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Stray files with invalid names are ignored.
            if let Ok(id) = SessionId::new(stem) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
