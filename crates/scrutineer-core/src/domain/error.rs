//! Workflow-level error taxonomy for Scrutineer.

use uuid::Uuid;

use crate::hitl::HitlError;
use crate::llm::ModelError;
use crate::workflow::{WorkflowEvent, WorkflowState};

/// Errors that stop a run (or a resume) before it reaches a resting state.
///
/// A category that cannot be resolved and a human rejection are ordinary
/// outcomes, not errors; see [`crate::RunOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("invalid transition: {event} while {from}")]
    InvalidTransition {
        from: WorkflowState,
        event: WorkflowEvent,
    },

    #[error("no suspended run with id {0}")]
    UnknownRun(Uuid),

    #[error("compliance judge failed: {0}")]
    Judge(#[source] ModelError),

    #[error("alternative proposer failed: {0}")]
    Proposer(#[source] ModelError),

    #[error("alternative proposer returned a blank suggestion for '{task}'")]
    BlankProposal { task: String },

    #[error("confirmation gate error: {0}")]
    Hitl(#[from] HitlError),

    #[error("session store error: {0}")]
    Session(#[from] scrutineer_state::StorageError),

    #[error("session document is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_display() {
        let err = WorkflowError::InvalidTransition {
            from: WorkflowState::Done,
            event: WorkflowEvent::Approved,
        };
        let msg = err.to_string();
        assert!(msg.contains("DONE"));
        assert!(msg.contains("approved"));
    }

    #[test]
    fn test_unknown_run_display() {
        let id = Uuid::new_v4();
        let err = WorkflowError::UnknownRun(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_blank_proposal_display() {
        let err = WorkflowError::BlankProposal {
            task: "22mm restrictor".to_string(),
        };
        assert!(err.to_string().contains("22mm restrictor"));
    }
}
