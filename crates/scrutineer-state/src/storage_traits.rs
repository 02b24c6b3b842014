//! Storage trait definitions for Scrutineer
//!
//! These traits define the two persistence seams of the workflow:
//! - `SessionStore`: durable per-session documents (task ledger + suspended runs)
//! - `MemoryService`: best-effort long-term memory written after each run
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Maximum accepted session id length.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Identifier of an operator session.
///
/// Restricted to `[A-Za-z0-9_-]` so it is safe to use as a file name or
/// database key without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Validate and wrap a session id.
    pub fn new(id: impl Into<String>) -> StorageResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(StorageError::InvalidSessionId {
                id,
                reason: "must not be empty".to_string(),
            });
        }
        if id.len() > MAX_SESSION_ID_LEN {
            return Err(StorageError::InvalidSessionId {
                id,
                reason: format!("longer than {MAX_SESSION_ID_LEN} characters"),
            });
        }
        if let Some(bad) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(StorageError::InvalidSessionId {
                reason: format!("contains {bad:?}"),
                id,
            });
        }
        Ok(SessionId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        SessionId::new(s)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// Top-level key holding a session document's revision.
pub const REVISION_KEY: &str = "revision";

/// Revision recorded in a session document, `0` when absent.
pub fn document_revision(document: &serde_json::Value) -> u64 {
    document
        .get(REVISION_KEY)
        .and_then(serde_json::Value::as_u64)
        .unwrap_or(0)
}

/// Copy of `document` with its revision set to `revision`.
///
/// # Errors
/// `StorageError::CorruptDocument` if the document is not a JSON object.
pub fn with_revision(
    session: &SessionId,
    document: &serde_json::Value,
    revision: u64,
) -> StorageResult<serde_json::Value> {
    let mut stamped = document.clone();
    let Some(fields) = stamped.as_object_mut() else {
        return Err(StorageError::CorruptDocument {
            session_id: session.to_string(),
            reason: "session document must be a JSON object".to_string(),
        });
    };
    fields.insert(REVISION_KEY.to_string(), revision.into());
    Ok(stamped)
}

/// Durable store of session documents.
///
/// Documents are opaque JSON objects owned by the workflow layer, apart from
/// the top-level [`REVISION_KEY`], which the store maintains.
///
/// Guarantees:
/// - `load` of a never-saved session returns `Ok(None)`.
/// - `save` replaces the whole document atomically (readers never observe a
///   half-written document).
/// - `save` is compare-and-swap on the revision: it succeeds only when the
///   stored revision (`0` for a missing document) equals `expected_revision`,
///   and stores the document at `expected_revision + 1`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the document for a session, `None` if nothing was saved yet.
    async fn load(&self, session: &SessionId) -> StorageResult<Option<serde_json::Value>>;

    /// Replace the document for a session and return its new revision.
    ///
    /// # Errors
    /// `StorageError::Conflict` if another writer saved the session since
    /// `expected_revision` was loaded.
    async fn save(
        &self,
        session: &SessionId,
        document: &serde_json::Value,
        expected_revision: u64,
    ) -> StorageResult<u64>;

    /// List all sessions that have a saved document, sorted by id.
    async fn list_sessions(&self) -> StorageResult<Vec<SessionId>>;
}

// ---------------------------------------------------------------------------
// MemoryService
// ---------------------------------------------------------------------------

/// Content digest (SHA-256 hex string) of a memory entry's content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        use sha2::Digest;
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentDigest(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = StorageError;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(StorageError::InvalidDigest { digest: s });
        }
        Ok(ContentDigest(s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a memory entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryEntryKind {
    /// Full session snapshot taken after a run came to rest
    SessionSnapshot,
    /// One-line summary of how a run ended
    RunOutcome,
}

impl std::fmt::Display for MemoryEntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionSnapshot => write!(f, "session_snapshot"),
            Self::RunOutcome => write!(f, "run_outcome"),
        }
    }
}

impl std::str::FromStr for MemoryEntryKind {
    type Err = StorageError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "session_snapshot" => Ok(Self::SessionSnapshot),
            "run_outcome" => Ok(Self::RunOutcome),
            other => Err(StorageError::Backend(format!(
                "unknown memory entry kind: {other}"
            ))),
        }
    }
}

/// One record in long-term memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: String,
    pub session_id: SessionId,
    pub run_id: Option<String>,
    pub kind: MemoryEntryKind,
    pub content: String,
    pub content_digest: ContentDigest,
    pub created_at: DateTime<Utc>,
}

impl MemoryEntry {
    /// Build a new entry, computing the content digest.
    pub fn new(
        session_id: SessionId,
        run_id: Option<String>,
        kind: MemoryEntryKind,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        MemoryEntry {
            id: uuid::Uuid::new_v4().to_string(),
            session_id,
            run_id,
            kind,
            content_digest: ContentDigest::from_bytes(content.as_bytes()),
            content,
            created_at: Utc::now(),
        }
    }

    /// Whether the stored digest still matches the content.
    pub fn verify_integrity(&self) -> bool {
        self.content_digest == ContentDigest::from_bytes(self.content.as_bytes())
    }
}

/// Search parameters for long-term memory.
///
/// `text` is split on whitespace; an entry matches when any term occurs in
/// its content (case-insensitive). No text matches everything.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    pub text: Option<String>,
    pub session_id: Option<SessionId>,
    pub kind: Option<MemoryEntryKind>,
    pub limit: Option<usize>,
}

impl MemoryQuery {
    /// Query that matches all entries.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn for_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_kind(mut self, kind: MemoryEntryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a single entry satisfies every filter of this query.
    pub fn matches(&self, entry: &MemoryEntry) -> bool {
        if let Some(ref sid) = self.session_id {
            if &entry.session_id != sid {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if entry.kind != kind {
                return false;
            }
        }
        match self.text.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(text) => {
                let haystack = entry.content.to_lowercase();
                text.split_whitespace()
                    .any(|term| haystack.contains(&term.to_lowercase()))
            }
        }
    }

    /// Filter, sort newest-first and truncate a set of candidate entries.
    pub fn apply(&self, entries: impl IntoIterator<Item = MemoryEntry>) -> Vec<MemoryEntry> {
        let mut matches: Vec<MemoryEntry> =
            entries.into_iter().filter(|e| self.matches(e)).collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = self.limit {
            matches.truncate(limit);
        }
        matches
    }
}

/// Long-term memory written after every run.
///
/// Writes are best-effort from the workflow's point of view: callers log
/// failures and carry on.
#[async_trait]
pub trait MemoryService: Send + Sync {
    /// Store one entry.
    async fn add_session_to_memory(&self, entry: MemoryEntry) -> StorageResult<()>;

    /// Search stored entries, newest first.
    async fn search(&self, query: &MemoryQuery) -> StorageResult<Vec<MemoryEntry>>;
}
