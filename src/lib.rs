//! # Visa Consult Client
//!
//! Client side of a backward-chaining visa expert system. The inference
//! engine runs remotely; this crate drives a consultation against it and
//! explains what the engine is doing while it asks questions.
//!
//! ## Features
//!
//! - **Consultation**: start, answer yes/no/unknown, detail sub-questions, reset
//! - **Live trace**: rules relevant to the current answers with condition
//!   and action state
//! - **Validation report**: contradictions, unreachable rules, cycles and
//!   orphaned facts found in the rule base
//! - **Analytics**: completion rates and most-asked questions
//!
//! ## Architecture
//!
//! ```text
//! CLI → Consultation (state machine) → EngineClient (HTTP) → Inference Engine
//!            ↓
//!     ConsultationState → TraceView → terminal
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use visa_consult_client::{Config, Consultation, EngineClient};
//! use visa_consult_client::model::Answer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = EngineClient::new(&config.engine, config.request.clone())?;
//!     let consultation = Consultation::new(Arc::new(client), config.consultation.goal_categories);
//!     consultation.start().await?;
//!     consultation.answer(Answer::Yes).await?;
//!     println!("{:?}", consultation.snapshot().await.pending_question());
//!     Ok(())
//! }
//! ```

/// Command-line parsing and commands.
pub mod cli;
/// Configuration loaded from the environment.
pub mod config;
/// Consultation state machine.
pub mod consultation;
/// Inference engine client and wire types.
pub mod engine;
/// Error types and result aliases for the application.
pub mod error;
/// Rule, working memory, validation and analytics models.
pub mod model;
/// Relevance filtering and trace rendering.
pub mod trace;

pub use config::Config;
pub use consultation::{Consultation, ConsultationState, Transition};
pub use engine::{EngineClient, InferenceEngine};
pub use error::{AppError, AppResult, ConsultationError, EngineError, ErrorKind};
