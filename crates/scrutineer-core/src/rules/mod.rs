//! Competition rule set.
//!
//! `RuleStore` maps category names to their rules and resolves loosely typed
//! category labels (`"Suspension and Brake System"`, `"aero"`) to a declared
//! category.

mod data;
pub mod error;
pub mod store;

pub use error::{CategoryNotFound, RuleError, RuleResult};
pub use store::{normalize_category, Category, Rule, RuleStore};
