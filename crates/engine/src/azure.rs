//! Azure OpenAI chat-completions engine.
//!
//! One POST per question against a deployment-scoped endpoint, authenticated
//! with the `api-key` header and versioned with the `api-version` query
//! parameter. Every call runs under an explicit deadline and failures come
//! back as typed [`EngineError`] values — the caller decides how to surface
//! them; there is no retry here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use logseek_config::EngineConfig;
use logseek_core::{EngineError, LogTable, QueryEngine};

use crate::prompt::system_prompt;

/// Azure OpenAI-backed [`QueryEngine`].
pub struct AzureQueryEngine {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    system_prompt: String,
}

impl AzureQueryEngine {
    /// Build an engine bound to the given table for process lifetime.
    pub fn new(config: &EngineConfig, table: &LogTable) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
            system_prompt: system_prompt(table, config.preview_rows),
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, self.deployment
        )
    }

    fn request_body(&self, question: &str) -> serde_json::Value {
        serde_json::json!({
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": question },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    async fn request(&self, question: &str) -> Result<String, EngineError> {
        debug!(deployment = %self.deployment, "Sending completion request");

        let response = self
            .client
            .post(self.completions_url())
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&self.request_body(question))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout {
                        limit_secs: self.timeout.as_secs(),
                    }
                } else {
                    EngineError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Engine returned error");
            return Err(error_for_status(status, body, retry_after));
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            EngineError::ApiError {
                status_code: 200,
                message: format!("Failed to parse response: {e}"),
            }
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| EngineError::ApiError {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl QueryEngine for AzureQueryEngine {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn answer(&self, question: &str) -> Result<String, EngineError> {
        match tokio::time::timeout(self.timeout, self.request(question)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout {
                limit_secs: self.timeout.as_secs(),
            }),
        }
    }
}

/// Map a non-200 status to a typed failure.
fn error_for_status(status: u16, message: String, retry_after: Option<u64>) -> EngineError {
    match status {
        429 => EngineError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(5),
        },
        401 | 403 => EngineError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ),
        400 => EngineError::MalformedQuery(message),
        _ => EngineError::ApiError {
            status_code: status,
            message,
        },
    }
}

// --- Azure OpenAI API types (internal) ---

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}
