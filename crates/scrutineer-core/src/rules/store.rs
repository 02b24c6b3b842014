//! Read-only rule store with a two-stage category resolver.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::data::FSUK_2026;
use super::error::{CategoryNotFound, RuleError, RuleResult};

/// A single competition rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub text: String,
}

/// A named group of rules, in declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub rules: Vec<Rule>,
}

impl Category {
    /// Find a rule by exact name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// `{rule name: rule text}` object, the shape handed to the judge.
    pub fn to_json(&self) -> Value {
        let map = self
            .rules
            .iter()
            .map(|r| (r.name.clone(), Value::String(r.text.clone())))
            .collect::<serde_json::Map<_, _>>();
        Value::Object(map)
    }
}

/// Normalize a category label: trim, lowercase, spaces and hyphens to `_`.
pub fn normalize_category(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Immutable mapping of category name to rules.
///
/// Built once at startup and shared read-only (`Arc<RuleStore>`) between runs.
#[derive(Debug, Clone)]
pub struct RuleStore {
    categories: Vec<Category>,
    normalized: Vec<String>,
}

impl RuleStore {
    /// The built-in FSUK 2026 rule digest.
    pub fn builtin() -> Self {
        let categories = FSUK_2026
            .iter()
            .map(|(name, rules)| Category {
                name: name.to_string(),
                rules: rules
                    .iter()
                    .map(|(n, t)| Rule {
                        name: n.to_string(),
                        text: t.to_string(),
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();
        let normalized = categories.iter().map(|c| normalize_category(&c.name)).collect();
        Self {
            categories,
            normalized,
        }
    }

    /// Build a store from categories, validating names and contents.
    pub fn from_categories(categories: Vec<Category>) -> RuleResult<Self> {
        if categories.is_empty() {
            return Err(RuleError::NoCategories);
        }

        let mut normalized: Vec<String> = Vec::with_capacity(categories.len());
        for cat in &categories {
            let norm = normalize_category(&cat.name);
            if norm.is_empty() {
                return Err(RuleError::InvalidFormat(
                    "category name must not be blank".to_string(),
                ));
            }
            if cat.rules.is_empty() {
                return Err(RuleError::EmptyCategory(cat.name.clone()));
            }
            if let Some(j) = normalized.iter().position(|n| *n == norm) {
                return Err(RuleError::DuplicateCategory {
                    name: cat.name.clone(),
                    existing: categories[j].name.clone(),
                });
            }
            normalized.push(norm);
        }

        Ok(Self {
            categories,
            normalized,
        })
    }

    /// Parse `{ "Category": { "Rule name": "Rule text" } }`, keeping key order.
    pub fn from_json_str(json: &str) -> RuleResult<Self> {
        let root: Value = serde_json::from_str(json)?;
        let Value::Object(top) = root else {
            return Err(RuleError::InvalidFormat(
                "top level must be an object of categories".to_string(),
            ));
        };

        let mut categories = Vec::with_capacity(top.len());
        for (name, rules) in top {
            let Value::Object(rules) = rules else {
                return Err(RuleError::InvalidFormat(format!(
                    "category '{name}' must be an object of rules"
                )));
            };
            let mut parsed = Vec::with_capacity(rules.len());
            for (rule_name, text) in rules {
                let Value::String(text) = text else {
                    return Err(RuleError::InvalidFormat(format!(
                        "rule '{rule_name}' in '{name}' must be a string"
                    )));
                };
                parsed.push(Rule {
                    name: rule_name,
                    text,
                });
            }
            categories.push(Category {
                name,
                rules: parsed,
            });
        }

        Self::from_categories(categories)
    }

    /// Load a rule set from a JSON file.
    pub fn from_json_file(path: &Path) -> RuleResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| RuleError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Resolve a category label to its rules.
    ///
    /// Stage 1 is an exact match on the normalized label. Stage 2 looks for
    /// the normalized label inside each normalized category name, in declared
    /// order, and takes the first hit. A blank label matches nothing.
    pub fn lookup(&self, category: &str) -> Result<&Category, CategoryNotFound> {
        let wanted = normalize_category(category);

        if !wanted.is_empty() {
            let exact = self.normalized.iter().position(|n| *n == wanted);
            let found = exact.or_else(|| self.normalized.iter().position(|n| n.contains(&wanted)));
            if let Some(i) = found {
                return Ok(&self.categories[i]);
            }
        }

        Err(CategoryNotFound {
            requested: category.to_string(),
            valid_categories: self.category_names(),
        })
    }

    /// Declared category names, in order.
    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// All categories, in declared order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Total number of rules across all categories.
    pub fn rule_count(&self) -> usize {
        self.categories.iter().map(|c| c.rules.len()).sum()
    }
}

impl Default for RuleStore {
    fn default() -> Self {
        Self::builtin()
    }
}
