//! Language model adapter.
//!
//! The workflow only sees the [`ComplianceJudge`](crate::checker::ComplianceJudge)
//! and [`AlternativeProposer`](crate::proposer::AlternativeProposer) ports;
//! [`GeminiClient`] implements both against the Gemini `generateContent` API.

pub mod error;
pub mod gemini;
pub mod prompt;

pub use error::{ModelError, ModelResult};
pub use gemini::{GeminiClient, GeminiConfig};
