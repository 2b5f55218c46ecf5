//! Pure projection from engine models to what the trace shows.
//!
//! Nothing here mutates state; a [`TraceView`] is rebuilt from the current
//! snapshot on every render.

use serde::Serialize;

use super::relevance::{group_by_category, relevant_rules};
use crate::model::{
    Combinator, FactSource, MemorySummary, Rule, RuleCatalog, RuleId, RuleStatus, Severity,
    ViewSlot, WorkingMemory,
};

/// Visual tone, mapped to colors by the text renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Muted,
    Positive,
    Negative,
    Derived,
    Highlight,
    Warning,
}

/// Display state of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FactState {
    ConfirmedTrue,
    ConfirmedFalse,
    DerivedTrue,
    DerivedFalse,
    Unconfirmed,
}

impl FactState {
    /// Findings are consulted before hypotheses.
    pub fn of(memory: Option<&WorkingMemory>, fact: &str) -> Self {
        match memory.and_then(|m| m.lookup(fact)) {
            Some(FactSource::Finding(true)) => FactState::ConfirmedTrue,
            Some(FactSource::Finding(false)) => FactState::ConfirmedFalse,
            Some(FactSource::Hypothesis(true)) => FactState::DerivedTrue,
            Some(FactSource::Hypothesis(false)) => FactState::DerivedFalse,
            None => FactState::Unconfirmed,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            FactState::ConfirmedTrue => Tone::Positive,
            FactState::ConfirmedFalse | FactState::DerivedFalse => Tone::Negative,
            FactState::DerivedTrue => Tone::Derived,
            FactState::Unconfirmed => Tone::Muted,
        }
    }
}

/// Badge and emphasis for a rule's evaluation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: Tone,
    /// Rendered faded, like a rule that no longer matters.
    pub dimmed: bool,
}

impl StatusBadge {
    /// `None` for rules that have not been evaluated.
    pub fn for_status(status: RuleStatus) -> Option<Self> {
        let badge = match status {
            RuleStatus::NotEvaluated => return None,
            RuleStatus::Fired => StatusBadge {
                label: "FIRED",
                tone: Tone::Highlight,
                dimmed: false,
            },
            RuleStatus::Evaluating => StatusBadge {
                label: "EVALUATING",
                tone: Tone::Warning,
                dimmed: false,
            },
            RuleStatus::Failed => StatusBadge {
                label: "FAILED",
                tone: Tone::Negative,
                dimmed: true,
            },
            RuleStatus::Skipped => StatusBadge {
                label: "SKIPPED",
                tone: Tone::Muted,
                dimmed: true,
            },
        };
        Some(badge)
    }
}

/// Marker printed before a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Joiner {
    Bullet,
    And,
    Or,
}

impl Joiner {
    pub fn symbol(&self) -> &'static str {
        match self {
            Joiner::Bullet => "•",
            Joiner::And => "∧",
            Joiner::Or => "∨",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionView {
    pub fact: String,
    pub joiner: Joiner,
    pub state: FactState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionView {
    pub fact: String,
    /// The fact is currently a hypothesis. Judged on its own, not from the
    /// owning rule's status.
    pub derived: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleView {
    pub id: RuleId,
    pub name: String,
    pub status: RuleStatus,
    pub badge: Option<StatusBadge>,
    pub conditions: Vec<ConditionView>,
    pub actions: Vec<ActionView>,
}

impl RuleView {
    pub fn project(rule: &Rule, memory: Option<&WorkingMemory>) -> Self {
        let conditions = rule
            .conditions
            .iter()
            .enumerate()
            .map(|(idx, cond)| ConditionView {
                fact: cond.fact.clone(),
                joiner: match (idx, cond.operator) {
                    (0, _) | (_, None) => Joiner::Bullet,
                    (_, Some(Combinator::And)) => Joiner::And,
                    (_, Some(Combinator::Or)) => Joiner::Or,
                },
                state: FactState::of(memory, &cond.fact),
            })
            .collect();

        let actions = rule
            .actions
            .iter()
            .map(|action| ActionView {
                fact: action.fact.clone(),
                derived: memory.map_or(false, |m| m.is_derived(&action.fact)),
            })
            .collect();

        RuleView {
            id: rule.id,
            name: rule.name.clone(),
            status: rule.status,
            badge: StatusBadge::for_status(rule.status),
            conditions,
            actions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub category: String,
    pub rules: Vec<RuleView>,
}

/// Everything the live trace panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceView {
    pub groups: Vec<GroupView>,
    pub summary: Option<MemorySummary>,
    pub catalog_unavailable: Option<String>,
    pub memory_unavailable: Option<String>,
}

impl TraceView {
    pub fn build(
        catalog: &ViewSlot<RuleCatalog>,
        memory: &ViewSlot<WorkingMemory>,
        pending_question: Option<&str>,
    ) -> Self {
        let wm = memory.ready();
        let rules = catalog.ready().map(RuleCatalog::rules).unwrap_or(&[]);

        let relevant = relevant_rules(rules, wm, pending_question);
        let groups = group_by_category(&relevant)
            .into_iter()
            .map(|group| GroupView {
                category: group.category.to_string(),
                rules: group
                    .rules
                    .into_iter()
                    .map(|rule| RuleView::project(rule, wm))
                    .collect(),
            })
            .collect();

        TraceView {
            groups,
            summary: wm.map(WorkingMemory::summary),
            catalog_unavailable: unavailable_reason(catalog),
            memory_unavailable: unavailable_reason(memory),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn unavailable_reason<T>(slot: &ViewSlot<T>) -> Option<String> {
    match slot {
        ViewSlot::Unavailable { reason } => Some(reason.clone()),
        _ => None,
    }
}

/// Visual weight of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Subtle,
    Normal,
    Strong,
}

impl From<Severity> for Emphasis {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::High => Emphasis::Strong,
            Severity::Medium => Emphasis::Normal,
            Severity::Low => Emphasis::Subtle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, Condition};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn memory() -> WorkingMemory {
        let findings: BTreeMap<String, bool> =
            [("yes fact".to_string(), true), ("no fact".to_string(), false)].into();
        let hypotheses: BTreeMap<String, bool> =
            [("derived".to_string(), true), ("refuted".to_string(), false)].into();
        WorkingMemory::new(findings, hypotheses, vec![1], BTreeMap::new()).unwrap()
    }

    fn rule(status: RuleStatus) -> Rule {
        Rule {
            id: 1,
            name: "E visa".to_string(),
            category: "E".to_string(),
            conditions: vec![
                Condition {
                    fact: "yes fact".to_string(),
                    operator: Some(Combinator::And),
                },
                Condition {
                    fact: "derived".to_string(),
                    operator: Some(Combinator::Or),
                },
                Condition {
                    fact: "open".to_string(),
                    operator: None,
                },
            ],
            actions: vec![
                Action {
                    fact: "derived".to_string(),
                    value: true,
                },
                Action {
                    fact: "later".to_string(),
                    value: true,
                },
            ],
            status,
        }
    }

    #[test]
    fn test_fact_states() {
        let wm = memory();
        assert_eq!(FactState::of(Some(&wm), "yes fact"), FactState::ConfirmedTrue);
        assert_eq!(FactState::of(Some(&wm), "no fact"), FactState::ConfirmedFalse);
        assert_eq!(FactState::of(Some(&wm), "derived"), FactState::DerivedTrue);
        assert_eq!(FactState::of(Some(&wm), "refuted"), FactState::DerivedFalse);
        assert_eq!(FactState::of(Some(&wm), "open"), FactState::Unconfirmed);
        assert_eq!(FactState::of(None, "yes fact"), FactState::Unconfirmed);
    }

    #[test]
    fn test_fact_tones() {
        assert_eq!(FactState::ConfirmedTrue.tone(), Tone::Positive);
        assert_eq!(FactState::DerivedFalse.tone(), Tone::Negative);
        assert_eq!(FactState::DerivedTrue.tone(), Tone::Derived);
        assert_eq!(FactState::Unconfirmed.tone(), Tone::Muted);
    }

    #[test]
    fn test_badges_are_distinct() {
        assert_eq!(StatusBadge::for_status(RuleStatus::NotEvaluated), None);
        let badges: Vec<StatusBadge> = [
            RuleStatus::Fired,
            RuleStatus::Evaluating,
            RuleStatus::Failed,
            RuleStatus::Skipped,
        ]
        .into_iter()
        .filter_map(StatusBadge::for_status)
        .collect();
        assert_eq!(badges.len(), 4);
        for (i, a) in badges.iter().enumerate() {
            for b in &badges[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_rule_projection() {
        let wm = memory();
        let view = RuleView::project(&rule(RuleStatus::Evaluating), Some(&wm));

        let joiners: Vec<Joiner> = view.conditions.iter().map(|c| c.joiner).collect();
        assert_eq!(joiners, vec![Joiner::Bullet, Joiner::Or, Joiner::Bullet]);
        assert_eq!(view.conditions[0].state, FactState::ConfirmedTrue);
        assert_eq!(view.badge.map(|b| b.label), Some("EVALUATING"));
        assert!(view.actions[0].derived);
        assert!(!view.actions[1].derived);
    }

    #[test]
    fn test_action_derivation_independent_of_status() {
        let wm = memory();
        // fired, but one action fact is not reflected in hypotheses yet
        let fired = RuleView::project(&rule(RuleStatus::Fired), Some(&wm));
        assert!(!fired.actions[1].derived);
        // not evaluated, yet its action fact is already derived
        let idle = RuleView::project(&rule(RuleStatus::NotEvaluated), Some(&wm));
        assert!(idle.actions[0].derived);
        assert_eq!(idle.badge, None);
    }

    #[test]
    fn test_trace_build_with_unavailable_memory() {
        let catalog = ViewSlot::Ready(RuleCatalog::new(vec![rule(RuleStatus::NotEvaluated)]).unwrap());
        let memory: ViewSlot<WorkingMemory> = ViewSlot::Unavailable {
            reason: "timeout".to_string(),
        };

        let view = TraceView::build(&catalog, &memory, Some("open"));
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.groups[0].category, "E");
        assert_eq!(view.memory_unavailable.as_deref(), Some("timeout"));
        assert_eq!(view.summary, None);
        assert!(view
            .groups[0]
            .rules[0]
            .conditions
            .iter()
            .all(|c| c.state == FactState::Unconfirmed));
    }

    #[test]
    fn test_trace_build_empty_before_interaction() {
        let catalog = ViewSlot::Ready(RuleCatalog::new(vec![rule(RuleStatus::Fired)]).unwrap());
        let view = TraceView::build(&catalog, &ViewSlot::NotLoaded, None);
        assert!(view.is_empty());
        assert_eq!(view.catalog_unavailable, None);
    }

    #[test]
    fn test_emphasis_follows_severity() {
        assert!(Emphasis::from(Severity::High) > Emphasis::from(Severity::Medium));
        assert!(Emphasis::from(Severity::Medium) > Emphasis::from(Severity::Low));
    }
}
