//! Domain models for Scrutineer.
//!
//! Canonical definitions for the values that flow through a run:
//! - `ComplianceVerdict`: the judge's yes/no with its cited reason
//! - `RunOutcome`: where a run came to rest
//! - `WorkflowError`: everything that can stop a run early

pub mod error;
pub mod run;
pub mod verdict;

pub use error::{Result, WorkflowError};
pub use run::{CommitPath, RunOutcome};
pub use verdict::ComplianceVerdict;
