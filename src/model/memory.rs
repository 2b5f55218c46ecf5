use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rule::{RuleId, RuleStatus};
use crate::error::{EngineError, EngineResult};

/// Snapshot of the engine's working memory for one session.
///
/// `findings` holds user-supplied facts and `hypotheses` holds facts derived
/// by rule firing. A key never appears in both; [`WorkingMemory::new`]
/// rejects snapshots that break this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkingMemory {
    findings: BTreeMap<String, bool>,
    hypotheses: BTreeMap<String, bool>,
    conflict_set: Vec<RuleId>,
    evaluated_rules: BTreeMap<RuleId, RuleStatus>,
}

/// Where a fact's current value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactSource {
    Finding(bool),
    Hypothesis(bool),
}

impl WorkingMemory {
    /// Validate a snapshot.
    pub fn new(
        findings: BTreeMap<String, bool>,
        hypotheses: BTreeMap<String, bool>,
        conflict_set: Vec<RuleId>,
        evaluated_rules: BTreeMap<RuleId, RuleStatus>,
    ) -> EngineResult<Self> {
        if let Some(fact) = findings.keys().find(|k| hypotheses.contains_key(*k)) {
            return Err(EngineError::protocol(format!(
                "fact '{}' is reported as both finding and hypothesis",
                fact
            )));
        }

        Ok(Self {
            findings,
            hypotheses,
            conflict_set,
            evaluated_rules,
        })
    }

    pub fn findings(&self) -> &BTreeMap<String, bool> {
        &self.findings
    }

    pub fn hypotheses(&self) -> &BTreeMap<String, bool> {
        &self.hypotheses
    }

    /// Fired rule ids in firing order.
    pub fn conflict_set(&self) -> &[RuleId] {
        &self.conflict_set
    }

    pub fn evaluated_rules(&self) -> &BTreeMap<RuleId, RuleStatus> {
        &self.evaluated_rules
    }

    /// Look a fact up, findings first.
    pub fn lookup(&self, fact: &str) -> Option<FactSource> {
        if let Some(value) = self.findings.get(fact) {
            return Some(FactSource::Finding(*value));
        }
        self.hypotheses.get(fact).map(|v| FactSource::Hypothesis(*v))
    }

    pub fn is_derived(&self, fact: &str) -> bool {
        self.hypotheses.contains_key(fact)
    }

    pub fn summary(&self) -> MemorySummary {
        MemorySummary {
            findings: self.findings.len(),
            hypotheses: self.hypotheses.len(),
            fired_rules: self.conflict_set.len(),
        }
    }
}

/// Counts shown under the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySummary {
    pub findings: usize,
    pub hypotheses: usize,
    pub fired_rules: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, bool)]) -> BTreeMap<String, bool> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_overlapping_fact_is_rejected() {
        let err = WorkingMemory::new(
            map(&[("a", true)]),
            map(&[("a", false)]),
            vec![],
            BTreeMap::new(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_lookup_prefers_findings() {
        let wm = WorkingMemory::new(
            map(&[("asked", false)]),
            map(&[("derived", true)]),
            vec![3],
            BTreeMap::new(),
        )
        .unwrap();

        assert_eq!(wm.lookup("asked"), Some(FactSource::Finding(false)));
        assert_eq!(wm.lookup("derived"), Some(FactSource::Hypothesis(true)));
        assert_eq!(wm.lookup("other"), None);
        assert!(wm.is_derived("derived"));
        assert!(!wm.is_derived("asked"));
    }

    #[test]
    fn test_summary_counts() {
        let wm = WorkingMemory::new(
            map(&[("a", true), ("b", false)]),
            map(&[("c", true)]),
            vec![1, 4],
            BTreeMap::new(),
        )
        .unwrap();

        assert_eq!(
            wm.summary(),
            MemorySummary {
                findings: 2,
                hypotheses: 1,
                fired_rules: 2
            }
        );
    }
}
