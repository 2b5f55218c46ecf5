use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Aggregate consultation statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsultationStats {
    pub total_consultations: u64,
    pub completed_consultations: u64,
    /// Completed consultations per goal category.
    #[serde(default)]
    pub visa_type_stats: BTreeMap<String, u64>,
    #[serde(default)]
    pub average_questions: f64,
}

impl ConsultationStats {
    /// Completed share as a whole percentage, 0 when nothing was started.
    pub fn completion_rate(&self) -> u32 {
        if self.total_consultations == 0 {
            return 0;
        }
        ((self.completed_consultations as f64 / self.total_consultations as f64) * 100.0).round()
            as u32
    }

    /// Share of completed consultations that reached `category`.
    pub fn category_share(&self, category: &str) -> f64 {
        if self.completed_consultations == 0 {
            return 0.0;
        }
        let count = self.visa_type_stats.get(category).copied().unwrap_or(0);
        count as f64 / self.completed_consultations as f64 * 100.0
    }
}

/// How often a question is asked and where it tends to appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionUsage {
    pub fact: String,
    pub usage_count: u64,
    pub average_order: f64,
}

/// Most frequently asked questions, most used first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionPaths {
    #[serde(default)]
    pub most_common_questions: Vec<QuestionUsage>,
}
