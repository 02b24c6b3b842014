//! Alternative proposer port.

use async_trait::async_trait;

use crate::domain::{Result, WorkflowError};
use crate::llm::ModelResult;

/// Suggests a compliant replacement for a task that failed the check.
#[async_trait]
pub trait AlternativeProposer: Send + Sync {
    async fn propose(&self, task: &str, reason: &str) -> ModelResult<String>;
}

/// Ask the proposer for one alternative, rejecting blank suggestions.
pub async fn propose_alternative(
    proposer: &dyn AlternativeProposer,
    task: &str,
    reason: &str,
) -> Result<String> {
    let suggestion = proposer
        .propose(task, reason)
        .await
        .map_err(WorkflowError::Proposer)?;

    let suggestion = suggestion.trim();
    if suggestion.is_empty() {
        return Err(WorkflowError::BlankProposal {
            task: task.to_string(),
        });
    }
    Ok(suggestion.to_string())
}
