//! The two-phase confirmation gate.

use serde::{Deserialize, Serialize};

use super::decision::{ConfirmationDecision, Decision};
use super::error::{HitlError, HitlResult};
use super::request::ConfirmationRequest;
use crate::obs;

/// What the gate tells the orchestrator.
///
/// Serialized as `{"status": "PENDING_APPROVAL"}` or
/// `{"status": "APPROVED" | "REJECTED", "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateResponse {
    /// No decision attached yet; the run must suspend.
    PendingApproval,
    /// The reviewer accepted the replacement.
    Approved { message: String },
    /// The reviewer declined the replacement.
    Rejected { message: String },
}

impl GateResponse {
    /// Whether the replacement may be committed.
    pub fn allows_proceed(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }

    /// Whether the review is finished.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::PendingApproval)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::PendingApproval => None,
            Self::Approved { message } | Self::Rejected { message } => Some(message),
        }
    }
}

/// Evaluate the gate for a request.
///
/// Pending versus resolved depends only on whether a decision is attached.
///
/// # Errors
///
/// Returns `HitlError::RequestMismatch` if the decision names another request.
pub fn confirm_suggestion(
    request: &ConfirmationRequest,
    decision: Option<&ConfirmationDecision>,
) -> HitlResult<GateResponse> {
    let Some(decision) = decision else {
        obs::emit_confirmation_requested(&request.run_id, &request.request_id);
        return Ok(GateResponse::PendingApproval);
    };

    if decision.request_id != request.request_id {
        return Err(HitlError::RequestMismatch {
            request_id: request.request_id.clone(),
            decision_request_id: decision.request_id.clone(),
        });
    }

    let response = match decision.decision {
        Decision::Approve => GateResponse::Approved {
            message: format!(
                "User approved. Proceeding with: '{}'.",
                request.suggested_replacement
            ),
        },
        Decision::Reject => GateResponse::Rejected {
            message: match &decision.comment {
                Some(comment) => format!("User rejected. Comment: {comment}"),
                None => "User rejected.".to_string(),
            },
        },
    };

    obs::emit_confirmation_resolved(
        &request.run_id,
        &request.request_id,
        decision.decision.is_approval(),
    );
    Ok(response)
}
