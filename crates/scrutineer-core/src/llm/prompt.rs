//! Prompt text and response parsing for the two judgment calls.

use crate::domain::ComplianceVerdict;
use crate::rules::Category;

use super::error::{ModelError, ModelResult};

/// System instruction for the compliance judgment.
pub const RULES_INSTRUCTION: &str = "You check Formula Student engineering tasks against the \
competition rules. You receive one rule category and one proposed task. Decide whether the task \
complies with every rule in the category. Reply with a single JSON object with two fields: \
\"compliant\" (true or false) and \"reason\" (quote the specific rule that was violated or \
satisfied, by name).";

/// System instruction for the alternative proposal.
pub const STRATEGY_INSTRUCTION: &str = "You are a Formula Student chief engineer. A proposed \
task failed a rules check. Suggest one alternative task that achieves the same engineering goal \
while following the cited rule. Reply with the alternative task description only, as one \
sentence, without preamble.";

/// User message for the compliance judgment.
pub fn compliance_prompt(category: &Category, task: &str) -> String {
    format!(
        "Category: {}\nRules:\n{}\n\nTask: {}",
        category.name,
        serde_json::to_string_pretty(&category.to_json()).unwrap_or_default(),
        task
    )
}

/// User message for the alternative proposal.
pub fn alternative_prompt(task: &str, reason: &str) -> String {
    format!("Failed task: {task}\nReason it failed: {reason}")
}

/// Strip a surrounding Markdown code fence, if any.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse a `{"compliant": bool, "reason": str}` object out of model text.
///
/// Tolerates code fences and prose around the object.
pub fn parse_verdict(raw: &str) -> ModelResult<ComplianceVerdict> {
    let body = strip_fence(raw);
    let (Some(start), Some(end)) = (body.find('{'), body.rfind('}')) else {
        return Err(ModelError::MalformedVerdict {
            raw: raw.to_string(),
            reason: "no JSON object found".to_string(),
        });
    };
    if end < start {
        return Err(ModelError::MalformedVerdict {
            raw: raw.to_string(),
            reason: "no JSON object found".to_string(),
        });
    }

    let verdict: ComplianceVerdict =
        serde_json::from_str(&body[start..=end]).map_err(|e| ModelError::MalformedVerdict {
            raw: raw.to_string(),
            reason: e.to_string(),
        })?;

    if verdict.reason.trim().is_empty() {
        return Err(ModelError::MalformedVerdict {
            raw: raw.to_string(),
            reason: "empty reason".to_string(),
        });
    }
    Ok(verdict)
}

/// Normalize a proposal: drop fences and wrapping quotes.
pub fn clean_proposal(raw: &str) -> String {
    let body = strip_fence(raw);
    body.trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleStore;

    #[test]
    fn test_parse_plain_verdict() {
        let v = parse_verdict(r#"{"compliant": true, "reason": "Starter Requirement met"}"#)
            .unwrap();
        assert!(v.compliant);
    }

    #[test]
    fn test_parse_fenced_verdict() {
        let raw = "```json\n{\"compliant\": false, \"reason\": \"Restrictor Diameter (Gasoline): 20mm max\"}\n```";
        let v = parse_verdict(raw).unwrap();
        assert!(!v.compliant);
        assert!(v.reason.contains("Restrictor Diameter"));
    }

    #[test]
    fn test_parse_verdict_with_prose() {
        let raw = "Here you go: {\"compliant\": true, \"reason\": \"ok\"} Hope that helps.";
        assert!(parse_verdict(raw).unwrap().compliant);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_verdict("yes it is fine"),
            Err(ModelError::MalformedVerdict { .. })
        ));
        assert!(matches!(
            parse_verdict("} backwards {"),
            Err(ModelError::MalformedVerdict { .. })
        ));
        assert!(matches!(
            parse_verdict(r#"{"compliant": "maybe", "reason": "x"}"#),
            Err(ModelError::MalformedVerdict { .. })
        ));
        assert!(matches!(
            parse_verdict(r#"{"compliant": true, "reason": "  "}"#),
            Err(ModelError::MalformedVerdict { .. })
        ));
    }

    #[test]
    fn test_clean_proposal() {
        assert_eq!(
            clean_proposal("  \"Install a 20mm restrictor\"  "),
            "Install a 20mm restrictor"
        );
        assert_eq!(clean_proposal("```\nUse 19mm for E85\n```"), "Use 19mm for E85");
    }

    #[test]
    fn test_compliance_prompt_includes_rules() {
        let store = RuleStore::builtin();
        let prompt = compliance_prompt(store.lookup("Powertrain").unwrap(), "22mm restrictor");
        assert!(prompt.contains("Restrictor Diameter (Gasoline)"));
        assert!(prompt.contains("Task: 22mm restrictor"));
    }
}
