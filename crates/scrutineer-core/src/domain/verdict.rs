//! Compliance verdicts.

use serde::{Deserialize, Serialize};

/// Result of judging one task against a category's rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    /// Whether the task satisfies every rule in the category.
    pub compliant: bool,
    /// The rule that was satisfied or violated, ideally quoted.
    pub reason: String,
}

impl ComplianceVerdict {
    pub fn compliant(reason: impl Into<String>) -> Self {
        Self {
            compliant: true,
            reason: reason.into(),
        }
    }

    pub fn non_compliant(reason: impl Into<String>) -> Self {
        Self {
            compliant: false,
            reason: reason.into(),
        }
    }
}
