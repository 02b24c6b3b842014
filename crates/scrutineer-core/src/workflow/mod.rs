//! Approval workflow: the orchestrator and its state machine.

pub mod engine;
pub mod state_machine;

pub use engine::ApprovalWorkflow;
pub use state_machine::{transition, WorkflowEvent, WorkflowState};
