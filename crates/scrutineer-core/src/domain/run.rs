//! Run outcomes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::hitl::ConfirmationRequest;
use crate::rules::CategoryNotFound;
use crate::workflow::WorkflowState;

/// How a committed task got into the ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommitPath {
    /// The original task passed the compliance check.
    Compliant,
    /// A reviewer approved the suggested replacement.
    ApprovedReplacement,
}

/// Where a run came to rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// A task was appended to the ledger.
    Committed {
        run_id: Uuid,
        category: String,
        /// The text actually committed (the replacement on the approval path).
        task: String,
        path: CommitPath,
        /// Ledger acknowledgement.
        ack: String,
        /// Gate message on the approval path.
        message: Option<String>,
    },
    /// The run is parked at the confirmation gate.
    AwaitingConfirmation {
        run_id: Uuid,
        request: ConfirmationRequest,
    },
    /// The reviewer rejected the replacement; nothing was committed.
    Rejected {
        run_id: Uuid,
        request: ConfirmationRequest,
        message: String,
    },
    /// The category label resolved to nothing; nothing was committed.
    CategoryNotFound {
        run_id: Uuid,
        not_found: CategoryNotFound,
    },
}

impl RunOutcome {
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::Committed { run_id, .. }
            | Self::AwaitingConfirmation { run_id, .. }
            | Self::Rejected { run_id, .. }
            | Self::CategoryNotFound { run_id, .. } => *run_id,
        }
    }

    /// State the run rests in.
    pub fn state(&self) -> WorkflowState {
        match self {
            Self::Committed { .. } => WorkflowState::Done,
            Self::AwaitingConfirmation { .. } => WorkflowState::AwaitingConfirmation,
            Self::Rejected { .. } | Self::CategoryNotFound { .. } => WorkflowState::Stopped,
        }
    }

    /// One-line description, used for logs and long-term memory.
    pub fn summary(&self) -> String {
        match self {
            Self::Committed {
                category,
                task,
                path: CommitPath::Compliant,
                ..
            } => format!("Committed '{task}' ({category}): compliant as proposed."),
            Self::Committed { category, task, .. } => {
                format!("Committed '{task}' ({category}): approved replacement.")
            }
            Self::AwaitingConfirmation { request, .. } => format!(
                "Awaiting confirmation ({}): '{}' -> '{}'. Reason: {}",
                request.category,
                request.original_task,
                request.suggested_replacement,
                request.reason
            ),
            Self::Rejected {
                request, message, ..
            } => format!(
                "Rejected replacement '{}' for '{}' ({}). {}",
                request.suggested_replacement, request.original_task, request.category, message
            ),
            Self::CategoryNotFound { not_found, .. } => format!(
                "{} Valid categories: {}",
                not_found,
                not_found.valid_categories.join(", ")
            ),
        }
    }
}
