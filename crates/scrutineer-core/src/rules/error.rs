//! Error types for the rule store.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating a rule set.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rules file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid rules format: {0}")]
    InvalidFormat(String),

    #[error("rule set has no categories")]
    NoCategories,

    #[error("category '{0}' has no rules")]
    EmptyCategory(String),

    #[error("category '{name}' collides with '{existing}' after normalization")]
    DuplicateCategory { name: String, existing: String },
}

/// Result type for rule store operations.
pub type RuleResult<T> = std::result::Result<T, RuleError>;

/// A category label that resolved to nothing.
///
/// This is an ordinary lookup outcome, not a failure of the store: callers
/// show `valid_categories` and let the operator try again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Category '{requested}' not found.")]
pub struct CategoryNotFound {
    /// The label exactly as the caller supplied it.
    pub requested: String,
    /// Every declared category name, in declared order.
    pub valid_categories: Vec<String>,
}
