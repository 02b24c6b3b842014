//! Error types for scrutineer-state

use thiserror::Error;

/// Errors raised by session and memory storage backends.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Session id contains characters that are not allowed in a key or file name
    #[error("invalid session id {id:?}: {reason}")]
    InvalidSessionId { id: String, reason: String },

    /// Digest string is not 64 lowercase hex characters
    #[error("invalid content digest: {digest}")]
    InvalidDigest { digest: String },

    /// Stored document could not be decoded
    #[error("corrupt session document for {session_id}: {reason}")]
    CorruptDocument { session_id: String, reason: String },

    /// Another writer saved the session after it was loaded
    #[error("session {session_id} changed concurrently: expected revision {expected}, found {found}")]
    Conflict {
        session_id: String,
        expected: u64,
        found: u64,
    },

    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failure
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Database or other backend failure
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_session_id_display() {
        let err = StorageError::InvalidSessionId {
            id: "../etc".to_string(),
            reason: "contains '/'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("../etc"));
        assert!(msg.contains("contains '/'"));
    }

    #[test]
    fn test_conflict_display() {
        let err = StorageError::Conflict {
            session_id: "garage".to_string(),
            expected: 3,
            found: 4,
        };
        let msg = err.to_string();
        assert!(msg.contains("garage"));
        assert!(msg.contains("expected revision 3, found 4"));
    }

    #[test]
    fn test_backend_error_display() {
        let err = StorageError::Backend("connection refused".to_string());
        assert!(err.to_string().contains("backend error"));
    }
}
