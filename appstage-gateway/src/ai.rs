//! AI execution endpoint client.
//!
//! The preview interpreter delegates prompt execution to an external AI
//! service. The wire contract is owned by that service:
//! request `{appId, aiAction, prompt, persona?, context}`, response
//! `{result: "..."}` on success or `{error: "..."}` on failure.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::http::{self, create_http_client};

/// One prompt-execution request as the AI endpoint expects it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiExecutionRequest {
    /// Id of the app document the prompt belongs to.
    pub app_id: String,
    /// Named AI capability the app author selected (e.g. "summarize").
    pub ai_action: String,
    /// Prompt text, already resolved against form state.
    pub prompt: String,
    /// Optional persona/system framing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    /// Form values referenced by the prompt, keyed by field id.
    pub context: BTreeMap<String, Value>,
}

/// AI endpoint response envelope.
#[derive(Debug, Clone, Deserialize)]
struct AiExecutionResponse {
    result: Option<String>,
    error: Option<String>,
}

/// Abstraction over the AI execution collaborator.
///
/// The core crate only depends on this trait; production wiring injects
/// [`HttpAiExecutor`], tests inject a scripted mock.
#[async_trait]
pub trait AiExecutor: Send + Sync {
    /// Execute one prompt and return the generated text.
    async fn execute(&self, request: &AiExecutionRequest) -> GatewayResult<String>;
}

/// HTTP implementation of [`AiExecutor`].
pub struct HttpAiExecutor {
    client: reqwest::Client,
    endpoint: String,
    max_retries: u32,
}

impl HttpAiExecutor {
    /// Create a client for the given execution endpoint URL.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: create_http_client(),
            endpoint: endpoint.into(),
            max_retries: 2,
        }
    }

    /// Override the transient-failure retry budget (default 2).
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

#[async_trait]
impl AiExecutor for HttpAiExecutor {
    async fn execute(&self, request: &AiExecutionRequest) -> GatewayResult<String> {
        log::debug!(
            "[gateway] ai action '{}' for app '{}'",
            request.ai_action,
            request.app_id
        );

        let builder = self.client.post(&self.endpoint).json(request);
        let (status, body) =
            http::execute_request_with_retry(builder, &self.endpoint, self.max_retries).await?;

        if !(200..300).contains(&status) {
            return Err(GatewayError::Status {
                endpoint: self.endpoint.clone(),
                status,
                body: http::truncate_body(&body),
            });
        }

        let response: AiExecutionResponse = http::parse_json(&body, &self.endpoint)?;
        if let Some(message) = response.error {
            return Err(GatewayError::ExecutionFailed { message });
        }
        response.result.ok_or_else(|| GatewayError::ParseError {
            endpoint: self.endpoint.clone(),
            detail: "response carried neither 'result' nor 'error'".to_string(),
        })
    }
}
