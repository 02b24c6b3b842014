//! Scrutineer Core Library
//!
//! Rule compliance checking and human-approved task commits for Formula
//! Student build plans. A task is judged against one rule category; a
//! compliant task goes straight into the session ledger, a non-compliant one
//! gets a suggested replacement that waits for a reviewer's decision.

pub mod checker;
pub mod config;
pub mod domain;
pub mod fakes;
pub mod hitl;
pub mod ledger;
pub mod llm;
pub mod obs;
pub mod proposer;
pub mod rules;
pub mod session;
pub mod telemetry;
pub mod workflow;

pub use checker::{CheckOutcome, ComplianceChecker, ComplianceJudge};
pub use config::{ConfigError, ScrutineerConfig, CONFIG_FILE};
pub use domain::{CommitPath, ComplianceVerdict, Result, RunOutcome, WorkflowError};
pub use hitl::{
    confirm_suggestion, ConfirmationDecision, ConfirmationRequest, Decision, GateResponse,
    HitlError,
};
pub use ledger::TaskLedger;
pub use llm::{GeminiClient, GeminiConfig, ModelError};
pub use proposer::{propose_alternative, AlternativeProposer};
pub use rules::{Category, CategoryNotFound, Rule, RuleError, RuleStore};
pub use session::{SessionState, SuspendedRun};
pub use telemetry::init_tracing;
pub use workflow::{transition, ApprovalWorkflow, WorkflowEvent, WorkflowState};

pub use scrutineer_state::{
    FsSessionStore, MemoryEntry, MemoryEntryKind, MemoryQuery, MemoryService, SessionId,
    SessionStore, SurrealMemoryService,
};

/// Scrutineer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
