//! Human-in-the-Loop (HITL) confirmation gate for Scrutineer.
//!
//! A non-compliant task is never silently rewritten: the suggested
//! replacement is parked in a [`ConfirmationRequest`] until a reviewer
//! attaches a [`ConfirmationDecision`].
//!
//! - **Pending**: no decision attached, the gate answers `PENDING_APPROVAL`
//!   and the run suspends.
//! - **Resolved**: a decision attached, the gate answers `APPROVED` or
//!   `REJECTED` with a message for the operator.

pub mod decision;
pub mod error;
pub mod gate;
pub mod request;

pub use decision::{ConfirmationDecision, Decision};
pub use error::{HitlError, HitlResult};
pub use gate::{confirm_suggestion, GateResponse};
pub use request::ConfirmationRequest;
