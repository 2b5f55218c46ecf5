use serde::{Deserialize, Serialize};

use super::rule::RuleId;

/// Issue severity. Ordered so that `High > Medium > Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rules that derive different values for one fact from the same conditions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contradiction {
    pub severity: Severity,
    pub rule_ids: Vec<RuleId>,
    pub fact: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// A rule whose conditions can never all be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreachableRule {
    pub severity: Severity,
    pub rule_id: RuleId,
    pub rule_name: String,
    #[serde(default)]
    pub impossible_conditions: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A dependency loop between facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircularReference {
    pub severity: Severity,
    /// Facts in cycle order; the last one leads back to the first.
    pub cycle: Vec<String>,
    #[serde(default)]
    pub involved_rules: Vec<RuleId>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CircularReference {
    /// `a → b → c → a`
    pub fn path(&self) -> String {
        match self.cycle.first() {
            Some(first) => {
                let mut parts: Vec<&str> = self.cycle.iter().map(String::as_str).collect();
                parts.push(first);
                parts.join(" → ")
            }
            None => String::new(),
        }
    }
}

/// A derived fact that no rule consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedFact {
    pub severity: Severity,
    pub fact: String,
    #[serde(default)]
    pub deriving_rules: Vec<RuleId>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The four issue categories, each in engine order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFindings {
    #[serde(default)]
    pub contradictions: Vec<Contradiction>,
    #[serde(default)]
    pub unreachable_rules: Vec<UnreachableRule>,
    #[serde(default)]
    pub circular_references: Vec<CircularReference>,
    #[serde(default)]
    pub orphaned_facts: Vec<OrphanedFact>,
}

/// Consistency-check output of the engine's rule base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    #[serde(default)]
    pub total_issues: Option<usize>,
    pub results: ValidationFindings,
}

impl ValidationReport {
    /// Number of issues across all categories.
    pub fn issue_count(&self) -> usize {
        let r = &self.results;
        r.contradictions.len()
            + r.unreachable_rules.len()
            + r.circular_references.len()
            + r.orphaned_facts.len()
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        let r = &self.results;
        r.contradictions
            .iter()
            .map(|i| i.severity)
            .chain(r.unreachable_rules.iter().map(|i| i.severity))
            .chain(r.circular_references.iter().map(|i| i.severity))
            .chain(r.orphaned_facts.iter().map(|i| i.severity))
            .max()
    }
}
