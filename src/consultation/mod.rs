//! Client-side consultation state machine.
//!
//! [`Consultation`] owns the state and talks to the engine;
//! [`ConsultationState`] is what renderers read.

mod machine;
mod state;

pub use machine::Consultation;
pub use state::{BackNavigation, ConsultationState, DetailQuestionContext, Phase, Transition};
