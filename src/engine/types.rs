use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::model::{Answer, ConsultationOutcome, RuleId, RuleStatus, WorkingMemory};

/// Request to open a consultation session
#[derive(Debug, Clone, Serialize)]
pub struct StartRequest {
    pub goal_categories: Vec<String>,
}

/// Raw response to a start request
#[derive(Debug, Clone, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    pub next_question: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Request carrying one answer
#[derive(Debug, Clone, Serialize)]
pub struct AnswerRequest {
    pub session_id: String,
    pub fact: String,
    pub answer: Answer,
}

/// Raw response to an answer request
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerResponse {
    pub next_question: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub result: Option<ConsultationOutcome>,
    #[serde(default)]
    pub detail_questions_needed: bool,
    #[serde(default)]
    pub detail_questions: Vec<String>,
    #[serde(default)]
    pub fired_rules: Vec<RuleId>,
    #[serde(default)]
    pub derived_facts: Vec<String>,
}

/// Raw working-memory payload
#[derive(Debug, Clone, Deserialize)]
pub struct WorkingMemoryResponse {
    #[serde(default)]
    pub findings: BTreeMap<String, bool>,
    #[serde(default)]
    pub hypotheses: BTreeMap<String, bool>,
    #[serde(default)]
    pub conflict_set: Vec<RuleId>,
    #[serde(default)]
    pub evaluated_rules: BTreeMap<RuleId, RuleStatus>,
}

/// A validated start response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    pub session_id: String,
    pub first_question: String,
}

/// What the engine wants next after an answer, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStep {
    /// Ask another question in the normal flow.
    Ask { question: String },
    /// The answer was `unknown` and narrower questions follow.
    /// Completion fields of the raw response are ignored in this branch.
    DetailQuestions {
        question: String,
        detail_questions: Vec<String>,
    },
    /// No more questions.
    Completed { outcome: ConsultationOutcome },
}

impl TryFrom<StartResponse> for SessionStart {
    type Error = EngineError;

    fn try_from(raw: StartResponse) -> Result<Self, Self::Error> {
        if raw.session_id.trim().is_empty() {
            return Err(EngineError::protocol("start response has an empty session_id"));
        }
        let first_question = raw
            .next_question
            .ok_or_else(|| EngineError::protocol("start response has no first question"))?;

        Ok(SessionStart {
            session_id: raw.session_id,
            first_question,
        })
    }
}

impl TryFrom<AnswerResponse> for EngineStep {
    type Error = EngineError;

    fn try_from(raw: AnswerResponse) -> Result<Self, Self::Error> {
        if raw.detail_questions_needed && !raw.detail_questions.is_empty() {
            let question = match raw.next_question {
                Some(q) => q,
                None => raw.detail_questions[0].clone(),
            };
            return Ok(EngineStep::DetailQuestions {
                question,
                detail_questions: raw.detail_questions,
            });
        }

        match (raw.is_completed, raw.next_question, raw.result) {
            (true, None, Some(outcome)) => Ok(EngineStep::Completed { outcome }),
            (true, None, None) => Err(EngineError::protocol(
                "completed answer response carries no result",
            )),
            (true, Some(q), _) => Err(EngineError::protocol(format!(
                "completed answer response also asks '{}'",
                q
            ))),
            (false, Some(question), _) => Ok(EngineStep::Ask { question }),
            (false, None, _) => Err(EngineError::protocol(
                "answer response has neither a next question nor completion",
            )),
        }
    }
}

impl TryFrom<WorkingMemoryResponse> for WorkingMemory {
    type Error = EngineError;

    fn try_from(raw: WorkingMemoryResponse) -> Result<Self, Self::Error> {
        WorkingMemory::new(
            raw.findings,
            raw.hypotheses,
            raw.conflict_set,
            raw.evaluated_rules,
        )
    }
}
