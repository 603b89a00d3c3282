//! Azure OpenAI agent implementation.
//!
//! Speaks the Azure chat-completions API:
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=...`
//! with an `api-key` header.
//!
//! One call per turn, no tool loop, no streaming. Failures map onto
//! `AgentError` and are never retried here — retry policy belongs to the
//! caller of the caller.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use tradewind_config::AgentConfig;
use tradewind_core::agent::{AgentReply, StrategyAgent, StructuredAnswer};
use tradewind_core::error::AgentError;

use crate::pricing::{ModelPricing, PricingTable};
use crate::prompt;

/// An Azure OpenAI-backed strategy agent.
///
/// Constructed once at process start and injected into the orchestrator by
/// handle; holds no mutable state.
pub struct AzureAgent {
    endpoint: String,
    deployment: String,
    api_version: String,
    api_key: String,
    temperature: f32,
    pricing: ModelPricing,
    client: reqwest::Client,
}

impl AzureAgent {
    /// Build an agent from configuration.
    ///
    /// Fails when no API key is configured; the request timeout comes from
    /// `agent.timeout_secs` and bounds the whole round-trip.
    pub fn from_config(config: &AgentConfig) -> Result<Self, AgentError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AgentError::AuthenticationFailed("No API key configured".into()))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
            api_key,
            temperature: config.temperature,
            pricing: PricingTable::with_defaults().resolve(&config.model),
            client,
        })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }

    /// Turn raw model output into the structured answer.
    ///
    /// The model is instructed to return a JSON object; when it does, that
    /// object is the answer (with `chatsummary` defaulted if missing). Any
    /// other output is wrapped verbatim as the answer text.
    fn parse_answer(content: &str, query: &str) -> StructuredAnswer {
        let fallback_summary = || format!("User asked: {query}");

        match serde_json::from_str::<serde_json::Value>(content.trim()) {
            Ok(value) if value.is_object() => {
                let mut answer: StructuredAnswer =
                    serde_json::from_value(value).unwrap_or_default();
                if answer.chatsummary.is_empty() {
                    answer.chatsummary = fallback_summary();
                }
                if answer.answer.is_empty() {
                    answer.answer = content.to_string();
                }
                answer
            }
            _ => StructuredAnswer {
                answer: content.to_string(),
                chatsummary: fallback_summary(),
                extra: serde_json::Map::new(),
            },
        }
    }
}

#[async_trait]
impl StrategyAgent for AzureAgent {
    fn name(&self) -> &str {
        "azure"
    }

    async fn complete(
        &self,
        query: &str,
        previous_summary: &str,
    ) -> Result<AgentReply, AgentError> {
        let body = serde_json::json!({
            "messages": [
                { "role": "system", "content": prompt::SYSTEM_PROMPT },
                { "role": "user", "content": prompt::user_message(query, previous_summary) },
            ],
            "temperature": self.temperature,
        });

        debug!(deployment = %self.deployment, "Sending agent completion request");

        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout(e.to_string())
                } else {
                    AgentError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(AgentError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(AgentError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Agent API returned error");
            return Err(AgentError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| {
            AgentError::MalformedOutput(format!("Failed to parse response: {e}"))
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or(AgentError::EmptyResponse)?;

        let content = choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or(AgentError::EmptyResponse)?;

        let answer = Self::parse_answer(&content, query);

        let (tokens, cost) = match &api_response.usage {
            Some(usage) => (
                usage.total_tokens,
                self.pricing
                    .cost(usage.prompt_tokens, usage.completion_tokens),
            ),
            None => (0, 0.0),
        };

        debug!(tokens, cost, "Agent turn complete");

        Ok(AgentReply {
            answer,
            tokens,
            cost,
        })
    }
}

// --- Azure API wire types ---

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
    #[serde(default)]
    total_tokens: u64,
}
