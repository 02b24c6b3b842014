//! Reviewer decisions on confirmation requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Approve or reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Accept the suggested replacement.
    Approve,
    /// Keep nothing; the run stops.
    Reject,
}

impl Decision {
    pub fn is_approval(self) -> bool {
        matches!(self, Self::Approve)
    }
}

/// A reviewer's answer to one confirmation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationDecision {
    /// The request this decision applies to.
    pub request_id: String,
    /// The decision.
    pub decision: Decision,
    /// Who decided (operator identifier), if known.
    pub reviewer: Option<String>,
    /// Optional comment from the reviewer.
    pub comment: Option<String>,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

impl ConfirmationDecision {
    pub fn new(request_id: impl Into<String>, decision: Decision) -> Self {
        Self {
            request_id: request_id.into(),
            decision,
            reviewer: None,
            comment: None,
            decided_at: Utc::now(),
        }
    }

    pub fn approve(request_id: impl Into<String>) -> Self {
        Self::new(request_id, Decision::Approve)
    }

    pub fn reject(request_id: impl Into<String>) -> Self {
        Self::new(request_id, Decision::Reject)
    }

    /// Attach a comment; blank comments are dropped.
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_reviewer(mut self, reviewer: impl Into<String>) -> Self {
        self.reviewer = Some(reviewer.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_is_approval() {
        assert!(Decision::Approve.is_approval());
        assert!(!Decision::Reject.is_approval());
    }

    #[test]
    fn test_blank_comment_dropped() {
        let d = ConfirmationDecision::reject("r1").with_comment(Some("  ".to_string()));
        assert_eq!(d.comment, None);
        let d = ConfirmationDecision::reject("r1").with_comment(Some("too heavy".to_string()));
        assert_eq!(d.comment.as_deref(), Some("too heavy"));
    }
}
