use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Engine-assigned rule identifier.
pub type RuleId = i64;

/// Per-session evaluation state of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    /// Not yet looked at by the engine.
    #[default]
    NotEvaluated,
    /// Currently on the engine's goal stack.
    Evaluating,
    /// Conditions satisfied and actions applied.
    Fired,
    /// Conditions can no longer be satisfied.
    Failed,
    /// Passed over, e.g. after an unknown answer.
    Skipped,
}

impl RuleStatus {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleStatus::NotEvaluated => "not_evaluated",
            RuleStatus::Evaluating => "evaluating",
            RuleStatus::Fired => "fired",
            RuleStatus::Failed => "failed",
            RuleStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Boolean combinator joining a condition to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    And,
    Or,
}

/// One condition (IF part) of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub fact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<Combinator>,
}

/// One action (THEN part) of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub fact: String,
    #[serde(default = "default_action_value")]
    pub value: bool,
}

fn default_action_value() -> bool {
    true
}

/// A production rule as reported by the engine for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    /// Owning goal category. The engine calls this `visa_type`.
    #[serde(alias = "visa_type")]
    pub category: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub status: RuleStatus,
}

impl Rule {
    /// Whether any condition or action mentions one of `facts`.
    pub fn mentions_any(&self, facts: &HashSet<&str>) -> bool {
        self.conditions.iter().any(|c| facts.contains(c.fact.as_str()))
            || self.actions.iter().any(|a| facts.contains(a.fact.as_str()))
    }

    pub fn is_fired(&self) -> bool {
        self.status == RuleStatus::Fired
    }
}

/// The ordered rule set of one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Validate a freshly fetched rule list. Ids must be unique.
    pub fn new(rules: Vec<Rule>) -> EngineResult<Self> {
        let mut seen = HashSet::with_capacity(rules.len());
        for rule in &rules {
            if !seen.insert(rule.id) {
                return Err(EngineError::protocol(format!(
                    "rule catalog contains duplicate id {}",
                    rule.id
                )));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules currently marked as fired, in catalog order.
    pub fn fired(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_fired())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_deserializes_engine_record() {
        let rule: Rule = serde_json::from_value(json!({
            "id": 2,
            "name": "Company meets E requirements",
            "visa_type": "E",
            "conditions": [
                {"fact": "investment ok", "operator": "OR"},
                {"fact": "trade ok", "operator": "OR"}
            ],
            "actions": [{"fact": "company meets E", "value": true}],
            "status": "fired"
        }))
        .unwrap();

        assert_eq!(rule.category, "E");
        assert_eq!(rule.conditions[1].operator, Some(Combinator::Or));
        assert!(rule.is_fired());
    }

    #[test]
    fn test_rule_defaults() {
        let rule: Rule = serde_json::from_value(json!({
            "id": 1,
            "name": "r",
            "category": "B",
            "conditions": [{"fact": "a"}],
            "actions": [{"fact": "b"}]
        }))
        .unwrap();

        assert_eq!(rule.status, RuleStatus::NotEvaluated);
        assert_eq!(rule.conditions[0].operator, None);
        assert!(rule.actions[0].value);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: Result<Rule, _> = serde_json::from_value(json!({
            "id": 1, "name": "r", "category": "B", "status": "exploded"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_catalog_rejects_duplicate_ids() {
        let rule: Rule = serde_json::from_value(json!({
            "id": 7, "name": "r", "category": "B"
        }))
        .unwrap();
        let err = RuleCatalog::new(vec![rule.clone(), rule]).unwrap_err();
        assert!(err.to_string().contains("duplicate id 7"));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(RuleStatus::NotEvaluated.to_string(), "not_evaluated");
        assert_eq!(RuleStatus::Skipped.to_string(), "skipped");
    }
}
