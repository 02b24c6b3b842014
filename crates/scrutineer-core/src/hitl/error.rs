//! Error types for the confirmation gate.

/// Errors produced by the human-in-the-loop gate.
#[derive(Debug, thiserror::Error)]
pub enum HitlError {
    #[error("invalid confirmation request: {field} {reason}")]
    InvalidRequest { field: &'static str, reason: String },

    #[error("decision for request {decision_request_id} does not match pending request {request_id}")]
    RequestMismatch {
        request_id: String,
        decision_request_id: String,
    },
}

/// Result type for HITL operations.
pub type HitlResult<T> = std::result::Result<T, HitlError>;
