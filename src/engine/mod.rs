//! Inference engine access.
//!
//! The engine owns rule evaluation; this client only speaks its HTTP
//! contract. Every response is parsed and validated here, so the rest of
//! the crate sees typed [`EngineStep`]s and models rather than raw JSON.

mod client;
mod types;


pub use client::EngineClient;
pub use types::*;

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::model::{Answer, RuleCatalog, WorkingMemory};

/// The engine operations a consultation depends on.
///
/// `start` and `answer` mutate engine-side session state and must not be
/// retried blindly. `rules` and `working_memory` are idempotent reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Open a session for the given goal categories.
    async fn start(&self, goal_categories: &[String]) -> EngineResult<SessionStart>;
    /// Record an answer to `fact` and get the next step.
    async fn answer(&self, session_id: &str, fact: &str, answer: Answer)
        -> EngineResult<EngineStep>;
    /// Fetch the session's rule catalog with current statuses.
    async fn rules(&self, session_id: &str) -> EngineResult<RuleCatalog>;
    /// Fetch the session's working memory.
    async fn working_memory(&self, session_id: &str) -> EngineResult<WorkingMemory>;
}
