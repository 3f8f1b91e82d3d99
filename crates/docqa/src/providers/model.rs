//! Schema-constrained model invocation

use async_trait::async_trait;

use crate::error::Result;
use crate::types::DocAnswer;

/// Output of one schema-constrained model call
///
/// Backends may hand back an already-typed answer or a generic JSON
/// payload that still needs validation; the synthesizer normalizes both.
#[derive(Debug, Clone)]
pub enum ModelPayload {
    /// Payload already conforming to the answer structure
    Answer(DocAnswer),
    /// Untyped payload requiring coercion
    Raw(serde_json::Value),
}

/// Trait for a single schema-constrained chat round-trip
///
/// Implementations:
/// - `OllamaModel`: structured outputs via a local Ollama server
#[async_trait]
pub trait StructuredModel: Send + Sync {
    /// Invoke the model once with a system and user instruction
    ///
    /// `schema` constrains the response shape; the caller still validates
    /// the payload.
    async fn invoke(
        &self,
        system: &str,
        user: &str,
        schema: &serde_json::Value,
    ) -> Result<ModelPayload>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
