//! Pure state machine for one approval run
//!
//! No I/O and no async: the engine feeds events in and acts on the state
//! that comes out. Invalid transitions are returned as errors, never panics.
//!
//! ```text
//! CHECKING --compliant--> COMMITTING --committed--> DONE
//! CHECKING --non_compliant--> PROPOSING --proposal_ready--> AWAITING_CONFIRMATION
//! AWAITING_CONFIRMATION --approved--> COMMITTING
//! AWAITING_CONFIRMATION --rejected--> STOPPED
//! CHECKING --category_not_found--> STOPPED
//! any non-terminal --failed--> STOPPED
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::WorkflowError;

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    /// Asking the compliance checker
    Checking,
    /// Asking the proposer for a compliant alternative
    Proposing,
    /// Suspended at the confirmation gate
    AwaitingConfirmation,
    /// Appending to the ledger
    Committing,
    /// Task committed
    Done,
    /// Ended without committing anything
    Stopped,
}

impl WorkflowState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Stopped)
    }
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Checking => "CHECKING",
            Self::Proposing => "PROPOSING",
            Self::AwaitingConfirmation => "AWAITING_CONFIRMATION",
            Self::Committing => "COMMITTING",
            Self::Done => "DONE",
            Self::Stopped => "STOPPED",
        };
        f.write_str(s)
    }
}

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowEvent {
    Compliant,
    NonCompliant,
    CategoryNotFound,
    ProposalReady,
    Approved,
    Rejected,
    Committed,
    /// A collaborator failed; the run stops where it is
    Failed,
}

impl std::fmt::Display for WorkflowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Compliant => "compliant",
            Self::NonCompliant => "non_compliant",
            Self::CategoryNotFound => "category_not_found",
            Self::ProposalReady => "proposal_ready",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Committed => "committed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Pure state transition function
///
/// # Errors
/// Returns `WorkflowError::InvalidTransition` for any pair not in the table
/// above, including every event delivered to a terminal state.
pub fn transition(
    state: WorkflowState,
    event: WorkflowEvent,
) -> Result<WorkflowState, WorkflowError> {
    use WorkflowEvent as E;
    use WorkflowState as S;

    match (state, event) {
        (S::Checking, E::Compliant) => Ok(S::Committing),
        (S::Checking, E::NonCompliant) => Ok(S::Proposing),
        (S::Checking, E::CategoryNotFound) => Ok(S::Stopped),
        (S::Proposing, E::ProposalReady) => Ok(S::AwaitingConfirmation),
        (S::AwaitingConfirmation, E::Approved) => Ok(S::Committing),
        (S::AwaitingConfirmation, E::Rejected) => Ok(S::Stopped),
        (S::Committing, E::Committed) => Ok(S::Done),
        (s, E::Failed) if !s.is_terminal() => Ok(S::Stopped),
        (from, event) => Err(WorkflowError::InvalidTransition { from, event }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(events: &[WorkflowEvent]) -> Result<WorkflowState, WorkflowError> {
        events
            .iter()
            .try_fold(WorkflowState::Checking, |s, e| transition(s, *e))
    }

    #[test]
    fn test_compliant_path() {
        let end = run(&[WorkflowEvent::Compliant, WorkflowEvent::Committed]).unwrap();
        assert_eq!(end, WorkflowState::Done);
    }

    #[test]
    fn test_approved_path() {
        let end = run(&[
            WorkflowEvent::NonCompliant,
            WorkflowEvent::ProposalReady,
            WorkflowEvent::Approved,
            WorkflowEvent::Committed,
        ])
        .unwrap();
        assert_eq!(end, WorkflowState::Done);
    }

    #[test]
    fn test_rejected_path() {
        let end = run(&[
            WorkflowEvent::NonCompliant,
            WorkflowEvent::ProposalReady,
            WorkflowEvent::Rejected,
        ])
        .unwrap();
        assert_eq!(end, WorkflowState::Stopped);
    }

    #[test]
    fn test_category_not_found_stops() {
        assert_eq!(
            run(&[WorkflowEvent::CategoryNotFound]).unwrap(),
            WorkflowState::Stopped
        );
    }

    #[test]
    fn test_failure_from_any_live_state() {
        for s in [
            WorkflowState::Checking,
            WorkflowState::Proposing,
            WorkflowState::AwaitingConfirmation,
            WorkflowState::Committing,
        ] {
            assert_eq!(
                transition(s, WorkflowEvent::Failed).unwrap(),
                WorkflowState::Stopped
            );
        }
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for s in [WorkflowState::Done, WorkflowState::Stopped] {
            for e in [
                WorkflowEvent::Compliant,
                WorkflowEvent::Approved,
                WorkflowEvent::Committed,
                WorkflowEvent::Failed,
            ] {
                assert!(transition(s, e).is_err(), "{s} accepted {e}");
            }
        }
    }

    #[test]
    fn test_skipping_the_gate_is_invalid() {
        let err = transition(WorkflowState::Proposing, WorkflowEvent::Approved).unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                from: WorkflowState::Proposing,
                event: WorkflowEvent::Approved
            }
        ));
        assert!(transition(WorkflowState::Checking, WorkflowEvent::Committed).is_err());
    }

    #[test]
    fn test_state_serde_names() {
        assert_eq!(
            serde_json::to_string(&WorkflowState::AwaitingConfirmation).unwrap(),
            "\"AWAITING_CONFIRMATION\""
        );
        assert_eq!(WorkflowState::AwaitingConfirmation.to_string(), "AWAITING_CONFIRMATION");
    }
}
