use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A user's answer to one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
    Unknown,
}

impl Answer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
            Answer::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Answer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yes" | "y" => Ok(Answer::Yes),
            "no" | "n" => Ok(Answer::No),
            "unknown" | "u" | "?" => Ok(Answer::Unknown),
            _ => Err(format!("Unknown answer: {}", s)),
        }
    }
}

/// One recorded `(question, answer)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: Answer,
    pub answered_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(question: impl Into<String>, answer: Answer) -> Self {
        Self {
            question: question.into(),
            answer,
            answered_at: Utc::now(),
        }
    }
}

/// Final goal achievability reported when a consultation completes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationOutcome {
    #[serde(default)]
    pub applicable_visas: Vec<String>,
    /// Every requested goal, in the order the engine reported them.
    #[serde(default)]
    pub all_goals: IndexMap<String, bool>,
}

impl ConsultationOutcome {
    pub fn has_applicable(&self) -> bool {
        !self.applicable_visas.is_empty()
    }
}
