//! Append-only task ledger.

use serde::{Deserialize, Serialize};

/// Ordered list of committed tasks for one session.
///
/// Entries are only ever appended: no deduplication, reordering or removal.
/// Serialized as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskLedger(Vec<String>);

impl TaskLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task and return the acknowledgement text.
    pub fn append(&mut self, task: impl Into<String>) -> String {
        let task = task.into();
        let ack = format!("Task '{task}' added to the ledger.");
        self.0.push(task);
        ack
    }

    /// Committed tasks in insertion order.
    pub fn list(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}
