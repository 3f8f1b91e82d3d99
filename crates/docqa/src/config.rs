//! Configuration for the QA pipeline

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main QA configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QaConfig {
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Synthesis configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
}

impl QaConfig {
    /// Load configuration from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Corpus namespace searched by retrieval
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Number of results to retrieve per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Minimum relevance score for retrieved chunks
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    /// Document cap when aggregating chunks into documents
    #[serde(default = "default_top_documents")]
    pub top_documents: usize,
}

fn default_namespace() -> String {
    "documentation".to_string()
}
fn default_top_k() -> usize {
    6
}
fn default_min_score() -> f32 {
    0.35
}
fn default_top_documents() -> usize {
    5
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            top_k: default_top_k(),
            min_score: default_min_score(),
            top_documents: default_top_documents(),
        }
    }
}

/// Synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Product context embedded into the system instruction so the model
    /// resolves product terminology correctly
    #[serde(default = "default_product_context")]
    pub product_context: String,
}

fn default_product_context() -> String {
    "The documentation corpus describes a developer platform; \
     answer using its own terminology."
        .to_string()
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            product_context: default_product_context(),
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Chat model name
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_chat_model() -> String {
    "phi3".to_string() // Fast 3.8B model for CPU
}
fn default_temperature() -> f32 {
    0.2 // Lower for more factual answers
}
fn default_timeout_secs() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
