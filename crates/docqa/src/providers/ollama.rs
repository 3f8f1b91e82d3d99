//! Ollama-backed planning and synthesis providers
//!
//! Uses Ollama structured outputs: the chat endpoint accepts a JSON
//! schema in the `format` field and constrains the response to it. No
//! automatic retries; a failed call propagates to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::types::QueryPlan;

use super::model::{ModelPayload, StructuredModel};
use super::planner::QueryPlanner;

/// Ollama chat API client with structured-output support
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    format: &'a serde_json::Value,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// One structured chat round-trip; the response content must parse as
    /// JSON. Error context is added by the calling provider.
    async fn chat_structured(
        &self,
        system: &str,
        user: &str,
        schema: &serde_json::Value,
    ) -> std::result::Result<serde_json::Value, String> {
        let url = format!("{}/api/chat", self.config.base_url);
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            format: schema,
            options: ChatOptions {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("chat request failed: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(format!("chat failed: HTTP {} - {}", status, body));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| format!("failed to parse chat response: {}", e))?;

        serde_json::from_str(&chat_response.message.content)
            .map_err(|e| format!("model returned non-JSON content: {}", e))
    }
}

/// Model-backed query planner via Ollama
pub struct OllamaPlanner {
    client: Arc<OllamaClient>,
}

const PLANNING_SYSTEM: &str = "\
You are a search query planner for a documentation corpus. Given a user \
question, produce between two and four distinct search queries that \
together cover the question: the question itself or a close rephrasing, \
plus queries for its key sub-topics or alternative vocabulary. Label the \
approach you took with one strategy: direct, decomposition, rephrasing, \
or expansion.";

impl OllamaPlanner {
    /// Create a planner sharing an existing client
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryPlanner for OllamaPlanner {
    async fn plan(&self, question: &str) -> Result<QueryPlan> {
        let user = format!("Question: {}\n\nProduce the search queries.", question);
        let schema = QueryPlan::schema();

        let value = self
            .client
            .chat_structured(PLANNING_SYSTEM, &user, &schema)
            .await
            .map_err(Error::Planning)?;

        let plan: QueryPlan = serde_json::from_value(value)
            .map_err(|e| Error::Planning(format!("malformed query plan: {}", e)))?;

        tracing::debug!("Planner produced {} queries", plan.queries.len());
        Ok(plan)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Schema-constrained synthesis model via Ollama
///
/// Returns the raw payload; validation into the answer structure happens
/// at the synthesis boundary.
pub struct OllamaModel {
    client: Arc<OllamaClient>,
}

impl OllamaModel {
    /// Create a model provider sharing an existing client
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StructuredModel for OllamaModel {
    async fn invoke(
        &self,
        system: &str,
        user: &str,
        schema: &serde_json::Value,
    ) -> Result<ModelPayload> {
        let value = self
            .client
            .chat_structured(system, user, schema)
            .await
            .map_err(Error::Synthesis)?;

        Ok(ModelPayload::Raw(value))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
