//! Scripted fakes for the judgment ports (testing only)
//!
//! Provides `ScriptedJudge` and `ScriptedProposer`, which answer from a
//! fixed script and record every call.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::checker::ComplianceJudge;
use crate::domain::ComplianceVerdict;
use crate::llm::{ModelError, ModelResult};
use crate::proposer::AlternativeProposer;
use crate::rules::Category;

#[derive(Debug, Clone)]
enum Reply<T> {
    Ok(T),
    Fail(String),
}

impl<T: Clone> Reply<T> {
    fn to_result(&self) -> ModelResult<T> {
        match self {
            Reply::Ok(v) => Ok(v.clone()),
            Reply::Fail(msg) => Err(ModelError::Unavailable(msg.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptedJudge
// ---------------------------------------------------------------------------

/// Judge that answers by substring rules on the task text.
///
/// Rules added with [`ScriptedJudge::when_contains`] are tried in order; the
/// first whose needle occurs in the task wins. Otherwise the default reply is
/// used.
#[derive(Debug)]
pub struct ScriptedJudge {
    rules: Vec<(String, Reply<ComplianceVerdict>)>,
    default: Reply<ComplianceVerdict>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedJudge {
    /// Judge that always returns `verdict`.
    pub fn always(verdict: ComplianceVerdict) -> Self {
        Self {
            rules: Vec::new(),
            default: Reply::Ok(verdict),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Judge whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self {
            rules: Vec::new(),
            default: Reply::Fail(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Return `verdict` for tasks containing `needle`.
    pub fn when_contains(mut self, needle: &str, verdict: ComplianceVerdict) -> Self {
        self.rules.push((needle.to_string(), Reply::Ok(verdict)));
        self
    }

    /// `(category, task)` for every call so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComplianceJudge for ScriptedJudge {
    async fn judge(&self, category: &Category, task: &str) -> ModelResult<ComplianceVerdict> {
        self.calls
            .lock()
            .unwrap()
            .push((category.name.clone(), task.to_string()));

        self.rules
            .iter()
            .find(|(needle, _)| task.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.default)
            .to_result()
    }
}

// ---------------------------------------------------------------------------
// ScriptedProposer
// ---------------------------------------------------------------------------

/// Proposer that always answers the same way.
#[derive(Debug)]
pub struct ScriptedProposer {
    reply: Reply<String>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedProposer {
    pub fn always(suggestion: &str) -> Self {
        Self {
            reply: Reply::Ok(suggestion.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Reply::Fail(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(task, reason)` for every call so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlternativeProposer for ScriptedProposer {
    async fn propose(&self, task: &str, reason: &str) -> ModelResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((task.to_string(), reason.to_string()));
        self.reply.to_result()
    }
}
