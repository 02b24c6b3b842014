//! Compliance checker: rule retrieval plus a pluggable judgment.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ComplianceVerdict;
use crate::llm::ModelResult;
use crate::obs;
use crate::rules::{Category, CategoryNotFound, RuleStore};

/// Decides whether a task complies with a category's rules.
///
/// Implemented by the model adapter in production and by scripted fakes in
/// tests.
#[async_trait]
pub trait ComplianceJudge: Send + Sync {
    async fn judge(&self, category: &Category, task: &str) -> ModelResult<ComplianceVerdict>;
}

/// Result of a compliance check.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// The category resolved and the judge ruled.
    Verdict {
        /// Declared name of the resolved category.
        category: String,
        verdict: ComplianceVerdict,
    },
    /// The category label did not resolve; the judge was never asked.
    CategoryNotFound(CategoryNotFound),
}

/// Looks up the rules for a category and asks the judge about a task.
#[derive(Clone)]
pub struct ComplianceChecker {
    rules: Arc<RuleStore>,
    judge: Arc<dyn ComplianceJudge>,
}

impl ComplianceChecker {
    pub fn new(rules: Arc<RuleStore>, judge: Arc<dyn ComplianceJudge>) -> Self {
        Self { rules, judge }
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub async fn check(&self, category: &str, task: &str) -> ModelResult<CheckOutcome> {
        let resolved = match self.rules.lookup(category) {
            Ok(c) => c,
            Err(not_found) => {
                obs::emit_category_not_found(category, not_found.valid_categories.len());
                return Ok(CheckOutcome::CategoryNotFound(not_found));
            }
        };

        let verdict = self.judge.judge(resolved, task).await?;
        obs::emit_verdict(&resolved.name, verdict.compliant);

        Ok(CheckOutcome::Verdict {
            category: resolved.name.clone(),
            verdict,
        })
    }
}
