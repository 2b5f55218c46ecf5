use serde::Serialize;
use tracing::warn;

use crate::engine::{EngineStep, SessionStart};
use crate::model::{
    Answer, ConsultationOutcome, HistoryEntry, RuleCatalog, ViewSlot, WorkingMemory,
};
use crate::trace::TraceView;

/// Where a consultation currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingAnswer,
    DetailQuestions,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::AwaitingAnswer => "awaiting_answer",
            Phase::DetailQuestions => "detail_questions",
            Phase::Completed => "completed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The question that was answered `unknown` and opened a detail sub-flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailQuestionContext {
    pub original_question: String,
    /// Narrower questions most recently announced by the engine.
    pub detail_questions: Vec<String>,
}

/// Result of a mutating consultation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Started { session_id: String, question: String },
    NextQuestion { question: String },
    DetailQuestions { question: String, context: String },
    Completed { outcome: ConsultationOutcome },
    /// The session was reset while the call was outstanding; its response
    /// was dropped.
    Discarded,
}

/// Outcome of a back-navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackNavigation {
    /// Nothing answered yet; state untouched.
    NothingToUndo,
    /// Stepping back one answer is not supported; the consultation was reset.
    RestartedFromBeginning,
}

/// All client-side consultation state.
///
/// Written only by [`super::Consultation`]; renderers get clones.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConsultationState {
    session_id: Option<String>,
    history: Vec<HistoryEntry>,
    pending_question: Option<String>,
    completed: bool,
    outcome: Option<ConsultationOutcome>,
    detail: Option<DetailQuestionContext>,
    rules: ViewSlot<RuleCatalog>,
    working_memory: ViewSlot<WorkingMemory>,
    /// Bumped on every reset so late responses can be recognized.
    generation: u64,
}

impl ConsultationState {
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn pending_question(&self) -> Option<&str> {
        self.pending_question.as_deref()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn outcome(&self) -> Option<&ConsultationOutcome> {
        self.outcome.as_ref()
    }

    pub fn detail_questions_mode(&self) -> bool {
        self.detail.is_some()
    }

    pub fn detail_context(&self) -> Option<&DetailQuestionContext> {
        self.detail.as_ref()
    }

    pub fn rules(&self) -> &ViewSlot<RuleCatalog> {
        &self.rules
    }

    pub fn working_memory(&self) -> &ViewSlot<WorkingMemory> {
        &self.working_memory
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        if self.session_id.is_none() {
            Phase::Idle
        } else if self.completed {
            Phase::Completed
        } else if self.detail.is_some() {
            Phase::DetailQuestions
        } else {
            Phase::AwaitingAnswer
        }
    }

    /// Project the current models into the live trace.
    pub fn trace(&self) -> TraceView {
        TraceView::build(
            &self.rules,
            &self.working_memory,
            self.pending_question.as_deref(),
        )
    }

    pub(crate) fn begin(&mut self, start: SessionStart) -> Transition {
        self.session_id = Some(start.session_id.clone());
        self.pending_question = Some(start.first_question.clone());
        self.history.clear();
        self.completed = false;
        self.outcome = None;
        self.detail = None;

        Transition::Started {
            session_id: start.session_id,
            question: start.first_question,
        }
    }

    /// Apply an engine-confirmed answer. History and question move together.
    pub(crate) fn record_answer(
        &mut self,
        question: String,
        answer: Answer,
        step: EngineStep,
    ) -> Transition {
        self.history.push(HistoryEntry::new(question.clone(), answer));

        match step {
            EngineStep::DetailQuestions {
                question: next,
                detail_questions,
            } => {
                // a continuation keeps the question that opened the sub-flow
                let original_question = match self.detail.take() {
                    Some(ctx) => ctx.original_question,
                    None => question,
                };
                self.detail = Some(DetailQuestionContext {
                    original_question: original_question.clone(),
                    detail_questions,
                });
                self.pending_question = Some(next.clone());

                Transition::DetailQuestions {
                    question: next,
                    context: original_question,
                }
            }
            EngineStep::Ask { question: next } => {
                self.detail = None;
                self.pending_question = Some(next.clone());
                self.completed = false;
                self.outcome = None;

                Transition::NextQuestion { question: next }
            }
            EngineStep::Completed { outcome } => {
                self.detail = None;
                self.pending_question = None;
                self.completed = true;
                self.outcome = Some(outcome.clone());

                Transition::Completed { outcome }
            }
        }
    }

    /// Replace both refreshed models at once.
    pub(crate) fn apply_refresh(
        &mut self,
        rules: ViewSlot<RuleCatalog>,
        working_memory: ViewSlot<WorkingMemory>,
    ) {
        if let (Some(old), Some(new)) = (self.working_memory.ready(), working_memory.ready()) {
            if new.conflict_set().len() < old.conflict_set().len() {
                warn!(
                    before = old.conflict_set().len(),
                    after = new.conflict_set().len(),
                    "Conflict set shrank within a session"
                );
            }
        }
        self.rules = rules;
        self.working_memory = working_memory;
    }

    /// Back to idle. Bumps the generation.
    pub(crate) fn clear(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = ConsultationState {
            generation,
            ..Default::default()
        };
    }
}
