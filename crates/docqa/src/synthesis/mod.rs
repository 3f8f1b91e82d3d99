//! Self-assessing answer synthesis
//!
//! Wraps one schema-constrained model call per invocation and normalizes
//! the payload into the canonical answer structure.

pub mod citation;
pub mod prompt;

pub use citation::{build_citations, build_citations_from_documents};
pub use prompt::PromptBuilder;

use std::sync::Arc;

use crate::config::SynthesisConfig;
use crate::error::{Error, Result};
use crate::providers::{ModelPayload, StructuredModel};
use crate::types::{Citation, DocAnswer, DocumentGroup, RetrievalResult};

use citation::format_key_map;

/// Wraps one schema-constrained model call per invocation
///
/// Callers never pass empty evidence; the no-evidence short-circuit
/// happens in the orchestrator before synthesis.
pub struct Synthesizer {
    model: Arc<dyn StructuredModel>,
    config: SynthesisConfig,
}

impl Synthesizer {
    /// Create a new synthesizer
    pub fn new(model: Arc<dyn StructuredModel>, config: SynthesisConfig) -> Self {
        Self { model, config }
    }

    /// Synthesize an answer from chunk-level evidence
    pub async fn synthesize(
        &self,
        question: &str,
        results: &[RetrievalResult],
        is_refinement: bool,
    ) -> Result<DocAnswer> {
        let citations = citation::build_citations(results);
        let context = PromptBuilder::build_context(results, &citations);
        self.invoke(question, citations, &context, is_refinement)
            .await
    }

    /// Synthesize an answer from document-level evidence
    pub async fn synthesize_documents(
        &self,
        question: &str,
        documents: &[DocumentGroup],
        is_refinement: bool,
    ) -> Result<DocAnswer> {
        let citations = citation::build_citations_from_documents(documents);
        let context = PromptBuilder::build_document_context(documents, &citations);
        self.invoke(question, citations, &context, is_refinement)
            .await
    }

    async fn invoke(
        &self,
        question: &str,
        citations: Vec<Citation>,
        context: &str,
        is_refinement: bool,
    ) -> Result<DocAnswer> {
        let system = PromptBuilder::system_prompt(&self.config.product_context, is_refinement);
        let user = PromptBuilder::user_prompt(question, &format_key_map(&citations), context);
        let schema = DocAnswer::schema();

        let payload = self.model.invoke(&system, &user, &schema).await?;
        normalize_payload(payload, citations)
    }
}

/// Coerce a model payload into the canonical answer structure
///
/// A typed payload only gets the computed citations when its own list is
/// empty; a model-supplied non-empty list is kept. An untyped payload
/// gets the computed citations attached when the field is missing, null,
/// or empty, then validates strictly. Anything else fails loudly.
pub fn normalize_payload(payload: ModelPayload, citations: Vec<Citation>) -> Result<DocAnswer> {
    match payload {
        ModelPayload::Answer(mut answer) => {
            if answer.citations.is_empty() {
                answer.citations = citations;
            }
            Ok(answer)
        }
        ModelPayload::Raw(mut value) => {
            let object = value
                .as_object_mut()
                .ok_or_else(|| Error::Synthesis("model returned a non-object payload".to_string()))?;

            let needs_backfill = match object.get("citations") {
                None | Some(serde_json::Value::Null) => true,
                Some(serde_json::Value::Array(items)) => items.is_empty(),
                Some(_) => false,
            };
            if needs_backfill {
                let computed = serde_json::to_value(&citations)
                    .map_err(|e| Error::Synthesis(format!("citations not serializable: {}", e)))?;
                object.insert("citations".to_string(), computed);
            }

            serde_json::from_value(value).map_err(|e| {
                Error::Synthesis(format!("payload does not match the answer structure: {}", e))
            })
        }
    }
}
