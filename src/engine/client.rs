use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::types::{
    AnswerRequest, AnswerResponse, EngineStep, SessionStart, StartRequest, StartResponse,
    WorkingMemoryResponse,
};
use super::InferenceEngine;
use crate::config::{EngineConfig, RequestConfig};
use crate::error::{EngineError, EngineResult};
use crate::model::{
    Answer, ConsultationStats, QuestionPaths, Rule, RuleCatalog, ValidationReport, WorkingMemory,
};

/// Client for the inference engine's HTTP API
#[derive(Clone)]
pub struct EngineClient {
    client: Client,
    base_url: String,
    request_config: RequestConfig,
}

impl EngineClient {
    /// Create a new engine client
    pub fn new(config: &EngineConfig, request_config: RequestConfig) -> EngineResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(EngineError::Transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            request_config,
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run the engine's rule-base consistency check
    pub async fn validation_report(&self) -> EngineResult<ValidationReport> {
        self.get_json("/api/admin/rules/validation/check").await
    }

    /// Fetch aggregate consultation statistics
    pub async fn consultation_stats(&self) -> EngineResult<ConsultationStats> {
        self.get_json("/api/admin/analytics/consultation-stats")
            .await
    }

    /// Fetch the most frequently asked questions
    pub async fn question_paths(&self, limit: u32) -> EngineResult<QuestionPaths> {
        self.get_json(&format!("/api/admin/analytics/question-paths?limit={}", limit))
            .await
    }

    /// GET a read-only resource, retrying transient failures with backoff
    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> EngineResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut last_error = None;
        let mut retries = 0;

        while retries <= self.request_config.max_retries {
            if retries > 0 {
                let delay = Duration::from_millis(
                    self.request_config.retry_delay_ms * (2_u64.pow(retries - 1)),
                );
                warn!(
                    endpoint = %endpoint,
                    retry = retries,
                    delay_ms = delay.as_millis(),
                    "Retrying engine request"
                );
                tokio::time::sleep(delay).await;
            }

            let start = Instant::now();

            match self.execute(endpoint, self.client.get(&url)).await {
                Ok(body) => {
                    debug!(
                        endpoint = %endpoint,
                        latency_ms = start.elapsed().as_millis(),
                        "Engine fetch succeeded"
                    );
                    return Ok(body);
                }
                Err(e) if !is_transient(&e) => return Err(e),
                Err(e) => {
                    error!(
                        endpoint = %endpoint,
                        error = %e,
                        latency_ms = start.elapsed().as_millis(),
                        retry = retries,
                        "Engine fetch failed"
                    );
                    last_error = Some(e);
                    retries += 1;
                }
            }
        }

        Err(EngineError::Unavailable {
            message: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown error".to_string()),
            retries,
        })
    }

    /// POST a mutating command exactly once
    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> EngineResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let start = Instant::now();

        let request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);

        let result = self.execute(endpoint, request).await;
        match &result {
            Ok(_) => info!(
                endpoint = %endpoint,
                latency_ms = start.elapsed().as_millis(),
                "Engine command succeeded"
            ),
            Err(e) => error!(
                endpoint = %endpoint,
                error = %e,
                latency_ms = start.elapsed().as_millis(),
                "Engine command failed"
            ),
        }
        result
    }

    /// Send a single request and decode its JSON body (internal)
    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> EngineResult<T> {
        debug!(endpoint = %endpoint, "Calling engine");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::Timeout {
                    timeout_ms: self.request_config.timeout_ms,
                }
            } else {
                EngineError::Transport(e)
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(EngineError::Api {
                status: status.as_u16(),
                message: error_body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| EngineError::Protocol {
                message: format!("Failed to parse {} response: {}", endpoint, e),
            })
    }
}

/// Whether a read-only fetch is worth repeating.
fn is_transient(err: &EngineError) -> bool {
    match err {
        EngineError::Timeout { .. } | EngineError::Transport(_) => true,
        EngineError::Api { status, .. } => *status >= 500,
        EngineError::Protocol { .. } | EngineError::Unavailable { .. } => false,
    }
}

#[async_trait]
impl InferenceEngine for EngineClient {
    async fn start(&self, goal_categories: &[String]) -> EngineResult<SessionStart> {
        let request = StartRequest {
            goal_categories: goal_categories.to_vec(),
        };
        let raw: StartResponse = self.post_json("/api/consultation/start", &request).await?;
        SessionStart::try_from(raw)
    }

    async fn answer(&self, session_id: &str, fact: &str, answer: Answer) -> EngineResult<EngineStep> {
        let request = AnswerRequest {
            session_id: session_id.to_string(),
            fact: fact.to_string(),
            answer,
        };
        let raw: AnswerResponse = self.post_json("/api/consultation/answer", &request).await?;
        EngineStep::try_from(raw)
    }

    async fn rules(&self, session_id: &str) -> EngineResult<RuleCatalog> {
        let rules: Vec<Rule> = self
            .get_json(&format!("/api/consultation/{}/rules", session_id))
            .await?;
        RuleCatalog::new(rules)
    }

    async fn working_memory(&self, session_id: &str) -> EngineResult<WorkingMemory> {
        let raw: WorkingMemoryResponse = self
            .get_json(&format!("/api/consultation/{}/working-memory", session_id))
            .await?;
        WorkingMemory::try_from(raw)
    }
}
