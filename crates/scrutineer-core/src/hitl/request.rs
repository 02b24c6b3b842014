//! Confirmation requests, the record a suspended run waits on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{HitlError, HitlResult};
use crate::domain::ComplianceVerdict;

/// A pending request for a human to approve a suggested replacement.
///
/// Exists only between suspend and resume of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    /// Unique identifier for this request.
    pub request_id: String,
    /// The run this request belongs to.
    pub run_id: Uuid,
    /// Declared name of the category the task was checked against.
    pub category: String,
    /// The task as first proposed.
    pub original_task: String,
    /// The compliant alternative offered instead.
    pub suggested_replacement: String,
    /// Why the original failed.
    pub reason: String,
    /// Re-check of the replacement, when re-validation is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion_check: Option<ComplianceVerdict>,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
}

impl ConfirmationRequest {
    /// Create a new request. Task, replacement and reason must not be blank.
    pub fn new(
        run_id: Uuid,
        category: impl Into<String>,
        original_task: impl Into<String>,
        suggested_replacement: impl Into<String>,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> HitlResult<Self> {
        let request = Self {
            request_id: Uuid::new_v4().to_string(),
            run_id,
            category: category.into(),
            original_task: original_task.into(),
            suggested_replacement: suggested_replacement.into(),
            reason: reason.into(),
            suggestion_check: None,
            created_at: now,
        };

        for (field, value) in [
            ("original_task", &request.original_task),
            ("suggested_replacement", &request.suggested_replacement),
            ("reason", &request.reason),
        ] {
            if value.trim().is_empty() {
                return Err(HitlError::InvalidRequest {
                    field,
                    reason: "must not be blank".to_string(),
                });
            }
        }
        Ok(request)
    }

    /// Attach the re-check verdict for the replacement.
    pub fn with_suggestion_check(mut self, verdict: ComplianceVerdict) -> Self {
        self.suggestion_check = Some(verdict);
        self
    }

    /// Short prompt shown to the reviewer.
    pub fn hint(&self) -> String {
        format!(
            "Approving change: {} -> {}",
            self.original_task, self.suggested_replacement
        )
    }

    /// The `{original_task, suggested_replacement, reason}` payload.
    pub fn payload(&self) -> serde_json::Value {
        serde_json::json!({
            "original_task": self.original_task,
            "suggested_replacement": self.suggested_replacement,
            "reason": self.reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfirmationRequest {
        ConfirmationRequest::new(
            Uuid::new_v4(),
            "Powertrain",
            "Install a 22mm restrictor",
            "Install a 20mm restrictor",
            "Restrictor Diameter (Gasoline): 20mm max",
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_hint() {
        assert_eq!(
            sample().hint(),
            "Approving change: Install a 22mm restrictor -> Install a 20mm restrictor"
        );
    }

    #[test]
    fn test_payload_has_exactly_three_fields() {
        let payload = sample().payload();
        let obj = payload.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(obj["suggested_replacement"], "Install a 20mm restrictor");
    }

    #[test]
    fn test_blank_replacement_rejected() {
        let err = ConfirmationRequest::new(Uuid::new_v4(), "Chassis", "a", " ", "r", Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            HitlError::InvalidRequest {
                field: "suggested_replacement",
                ..
            }
        ));
    }

    #[test]
    fn test_serde_roundtrip_with_check() {
        let req = sample().with_suggestion_check(ComplianceVerdict::compliant("20mm is the max"));
        let json = serde_json::to_string(&req).unwrap();
        let back: ConfirmationRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn test_check_omitted_when_absent() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("suggestion_check").is_none());
    }
}
