use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::state::{BackNavigation, ConsultationState, Transition};
use crate::error::{ConsultationError, ConsultationResult};
use crate::engine::InferenceEngine;
use crate::model::{Answer, ViewSlot};

/// Drives one consultation against an inference engine.
///
/// This is the only writer of [`ConsultationState`]. `start` and `answer`
/// are serialized: while one is outstanding (including its follow-up
/// refresh) any other mutating call is rejected with
/// [`ConsultationError::Busy`]. `reset` is always accepted, makes any
/// outstanding response stale and frees the slot for the next `start`.
pub struct Consultation<E> {
    engine: Arc<E>,
    goal_categories: Vec<String>,
    state: Arc<RwLock<ConsultationState>>,
    /// Claim token of the call holding the slot: its generation + 1, or
    /// `FREE`.
    in_flight: Arc<AtomicU64>,
}

const FREE: u64 = 0;

impl<E> Clone for Consultation<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            goal_categories: self.goal_categories.clone(),
            state: Arc::clone(&self.state),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

/// Releases the in-flight slot when the owning call finishes or is dropped,
/// unless a call from a newer generation has taken it over.
struct InFlightGuard<'a> {
    slot: &'a AtomicU64,
    token: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let _ = self
            .slot
            .compare_exchange(self.token, FREE, Ordering::AcqRel, Ordering::Acquire);
    }
}

impl<E: InferenceEngine> Consultation<E> {
    /// Create an idle consultation for the given goal categories.
    pub fn new(engine: Arc<E>, goal_categories: Vec<String>) -> Self {
        Self {
            engine,
            goal_categories,
            state: Arc::new(RwLock::new(ConsultationState::default())),
            in_flight: Arc::new(AtomicU64::new(FREE)),
        }
    }

    /// A copy of the current state for rendering.
    pub async fn snapshot(&self) -> ConsultationState {
        self.state.read().await.clone()
    }

    /// Whether a mutating call is outstanding, including one a reset has
    /// already made stale.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) != FREE
    }

    /// Take the in-flight slot for `generation`.
    ///
    /// Callers hold the state read lock, so `generation` is current. A slot
    /// held by an older generation belongs to a call whose response will be
    /// discarded and is taken over.
    fn claim(
        &self,
        operation: &'static str,
        generation: u64,
    ) -> ConsultationResult<InFlightGuard<'_>> {
        let token = generation.wrapping_add(1);
        let mut current = self.in_flight.load(Ordering::Acquire);
        loop {
            if current == token {
                warn!(operation, generation, "Rejected call while another is in flight");
                return Err(ConsultationError::Busy { operation });
            }
            match self.in_flight.compare_exchange(
                current,
                token,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    if current != FREE {
                        debug!(operation, generation, "Took over slot from a call made stale by reset");
                    }
                    return Ok(InFlightGuard {
                        slot: &self.in_flight,
                        token,
                    });
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Open a new session and load its rules and working memory.
    ///
    /// Fails without touching state if a session is already active or the
    /// engine call fails.
    pub async fn start(&self) -> ConsultationResult<Transition> {
        let (_guard, generation) = {
            let state = self.state.read().await;
            let generation = state.generation();
            let guard = self.claim("start", generation)?;
            if let Some(session_id) = state.session_id() {
                return Err(ConsultationError::AlreadyActive {
                    session_id: session_id.to_string(),
                });
            }
            (guard, generation)
        };

        debug!(goals = ?self.goal_categories, "Starting consultation");
        let started = match self.engine.start(&self.goal_categories).await {
            Ok(started) => started,
            Err(e) => {
                warn!(error = %e, "Consultation start failed");
                return Err(e.into());
            }
        };
        let session_id = started.session_id.clone();

        let transition = {
            let mut state = self.state.write().await;
            if state.generation() != generation {
                warn!(session_id = %session_id, generation, "Discarding start response after reset");
                return Ok(Transition::Discarded);
            }
            state.begin(started)
        };

        info!(
            session_id = %session_id,
            question = ?pending_of(&transition),
            "Consultation started"
        );

        self.refresh(&session_id, generation).await;
        Ok(transition)
    }

    /// Answer the pending question.
    ///
    /// History only grows once the engine has accepted the answer, so a
    /// failed call can be retried without a duplicate entry.
    pub async fn answer(&self, answer: Answer) -> ConsultationResult<Transition> {
        let (_guard, session_id, question, generation) = {
            let state = self.state.read().await;
            let generation = state.generation();
            let guard = self.claim("answer", generation)?;
            let session_id = state
                .session_id()
                .ok_or(ConsultationError::NoActiveSession)?
                .to_string();
            if state.is_completed() {
                return Err(ConsultationError::Completed);
            }
            let question = state
                .pending_question()
                .ok_or(ConsultationError::NoPendingQuestion)?
                .to_string();
            (guard, session_id, question, generation)
        };

        debug!(session_id = %session_id, question = %question, answer = %answer, "Sending answer");
        let step = match self.engine.answer(&session_id, &question, answer).await {
            Ok(step) => step,
            Err(e) => {
                warn!(session_id = %session_id, question = %question, error = %e, "Answer failed");
                return Err(e.into());
            }
        };

        let (transition, phase) = {
            let mut state = self.state.write().await;
            if state.generation() != generation {
                warn!(session_id = %session_id, generation, "Discarding answer response after reset");
                return Ok(Transition::Discarded);
            }
            let transition = state.record_answer(question.clone(), answer, step);
            (transition, state.phase())
        };

        info!(
            session_id = %session_id,
            question = %question,
            answer = %answer,
            phase = %phase,
            next = ?pending_of(&transition),
            "Answer recorded"
        );

        self.refresh(&session_id, generation).await;
        Ok(transition)
    }

    /// Re-fetch rules and working memory for the active session.
    pub async fn refresh_views(&self) -> ConsultationResult<()> {
        let (_guard, session_id, generation) = {
            let state = self.state.read().await;
            let generation = state.generation();
            let guard = self.claim("refresh", generation)?;
            let session_id = state
                .session_id()
                .ok_or(ConsultationError::NoActiveSession)?
                .to_string();
            (guard, session_id, generation)
        };

        self.refresh(&session_id, generation).await;
        Ok(())
    }

    /// Fetch both models together and apply them as one pair.
    async fn refresh(&self, session_id: &str, generation: u64) {
        let (rules, memory) = tokio::join!(
            self.engine.rules(session_id),
            self.engine.working_memory(session_id)
        );

        if let Err(e) = &rules {
            warn!(session_id = %session_id, error = %e, "Rule catalog unavailable");
        }
        if let Err(e) = &memory {
            warn!(session_id = %session_id, error = %e, "Working memory unavailable");
        }

        let mut state = self.state.write().await;
        if state.generation() != generation {
            warn!(session_id = %session_id, generation, "Discarding refresh after reset");
            return;
        }
        state.apply_refresh(ViewSlot::from_result(rules), ViewSlot::from_result(memory));
    }

    /// Drop the session and everything derived from it.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        let session_id = state.session_id().map(str::to_string);
        state.clear();
        info!(session_id = ?session_id, "Consultation reset");
    }

    /// Step back one question.
    ///
    /// Undoing a single answer would require the engine to un-derive facts,
    /// which it cannot do, so this restarts the consultation instead.
    pub async fn go_back(&self) -> BackNavigation {
        let mut state = self.state.write().await;
        if state.history().is_empty() {
            return BackNavigation::NothingToUndo;
        }
        let session_id = state.session_id().map(str::to_string);
        state.clear();
        info!(session_id = ?session_id, "Back navigation restarted the consultation");
        BackNavigation::RestartedFromBeginning
    }
}

fn pending_of(transition: &Transition) -> Option<&str> {
    match transition {
        Transition::Started { question, .. }
        | Transition::NextQuestion { question }
        | Transition::DetailQuestions { question, .. } => Some(question.as_str()),
        Transition::Completed { .. } | Transition::Discarded => None,
    }
}
