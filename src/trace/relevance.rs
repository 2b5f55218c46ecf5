use std::collections::HashSet;

use crate::model::{Rule, WorkingMemory};

/// Rules of one category, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleGroup<'a> {
    pub category: &'a str,
    pub rules: Vec<&'a Rule>,
}

/// Select the rules worth showing for the current point in the consultation.
///
/// A rule is kept when one of its conditions or actions mentions an answered
/// fact or the pending question, or when it has fired. Before the first
/// question and first finding nothing is shown, fired rules included.
pub fn relevant_rules<'a>(
    rules: &'a [Rule],
    memory: Option<&WorkingMemory>,
    pending_question: Option<&str>,
) -> Vec<&'a Rule> {
    let findings = memory.map(|m| m.findings());
    let no_findings = findings.map_or(true, |f| f.is_empty());
    if rules.is_empty() || (pending_question.is_none() && no_findings) {
        return Vec::new();
    }

    let mut facts: HashSet<&str> = findings
        .into_iter()
        .flat_map(|f| f.keys().map(String::as_str))
        .collect();
    if let Some(question) = pending_question {
        facts.insert(question);
    }

    rules
        .iter()
        .filter(|rule| rule.mentions_any(&facts) || rule.is_fired())
        .collect()
}

/// Partition rules by category. Categories keep first-seen order and rules
/// keep their input order within a category.
pub fn group_by_category<'a>(rules: &[&'a Rule]) -> Vec<RuleGroup<'a>> {
    let mut groups: Vec<RuleGroup<'a>> = Vec::new();

    for &rule in rules {
        match groups.iter_mut().find(|g| g.category == rule.category) {
            Some(group) => group.rules.push(rule),
            None => groups.push(RuleGroup {
                category: rule.category.as_str(),
                rules: vec![rule],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Action, Condition, RuleStatus};
    use std::collections::BTreeMap;

    fn rule(id: i64, category: &str, conditions: &[&str], action: &str, status: RuleStatus) -> Rule {
        Rule {
            id,
            name: format!("rule {}", id),
            category: category.to_string(),
            conditions: conditions
                .iter()
                .map(|f| Condition {
                    fact: f.to_string(),
                    operator: None,
                })
                .collect(),
            actions: vec![Action {
                fact: action.to_string(),
                value: true,
            }],
            status,
        }
    }

    fn memory(findings: &[(&str, bool)]) -> WorkingMemory {
        WorkingMemory::new(
            findings.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            BTreeMap::new(),
            vec![],
            BTreeMap::new(),
        )
        .unwrap()
    }

    fn catalog() -> Vec<Rule> {
        vec![
            rule(1, "E", &["nationality", "company E"], "E ok", RuleStatus::NotEvaluated),
            rule(2, "E", &["investment", "trade"], "company E", RuleStatus::NotEvaluated),
            rule(3, "B", &["business trip"], "B ok", RuleStatus::Fired),
            rule(4, "L", &["one year employment"], "L ok", RuleStatus::Evaluating),
        ]
    }

    #[test]
    fn test_nothing_before_interaction() {
        let rules = catalog();
        assert!(relevant_rules(&rules, None, None).is_empty());
        assert!(relevant_rules(&rules, Some(&memory(&[])), None).is_empty());
    }

    #[test]
    fn test_pending_question_selects_condition_rules() {
        let rules = catalog();
        let ids: Vec<i64> = relevant_rules(&rules, None, Some("investment"))
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_action_fact_counts() {
        let rules = catalog();
        let ids: Vec<i64> = relevant_rules(&rules, None, Some("company E"))
            .iter()
            .map(|r| r.id)
            .collect();
        // rule 1 mentions it as a condition, rule 2 derives it
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_findings_select_rules() {
        let rules = catalog();
        let wm = memory(&[("one year employment", true)]);
        let ids: Vec<i64> = relevant_rules(&rules, Some(&wm), None)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[test]
    fn test_fired_rule_always_included() {
        let rules = catalog();
        let relevant = relevant_rules(&rules, None, Some("unrelated"));
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].id, 3);
    }

    #[test]
    fn test_grouping_preserves_order() {
        let rules = vec![
            rule(1, "B", &["x"], "b1", RuleStatus::NotEvaluated),
            rule(2, "E", &["x"], "e1", RuleStatus::NotEvaluated),
            rule(3, "B", &["x"], "b2", RuleStatus::NotEvaluated),
            rule(4, "E", &["x"], "e2", RuleStatus::NotEvaluated),
        ];
        let relevant = relevant_rules(&rules, None, Some("x"));
        let groups = group_by_category(&relevant);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "B");
        assert_eq!(
            groups[0].rules.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(groups[1].category, "E");
        assert_eq!(
            groups[1].rules.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![2, 4]
        );
    }
}
