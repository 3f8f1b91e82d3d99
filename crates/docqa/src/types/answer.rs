//! Synthesized answers with citations and a self-assessed verdict

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::retrieval::LineSpan;

/// Self-reported completeness of a synthesized answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// The question is fully addressed with concrete details
    High,
    /// Some relevant information was found but key details are missing
    Partial,
    /// The evidence does not address the question
    Insufficient,
}

/// Stable reference to the source backing one or more claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Short alphabetic key used inline in the answer ("A", "B", ...)
    pub key: String,
    /// Source path relative to the corpus root
    pub relative_path: String,
    /// Line range (absent for whole-document citations)
    #[serde(default)]
    pub line_span: Option<LineSpan>,
}

impl Citation {
    /// Format one line of the key map handed to the model
    pub fn format_key_map_line(&self) -> String {
        match self.line_span {
            Some(span) => format!(
                "[{}] = {}:{}-{}",
                self.key, self.relative_path, span.start, span.end
            ),
            None => format!("[{}] = {}", self.key, self.relative_path),
        }
    }
}

/// Markdown answer with citations and a completeness verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocAnswer {
    /// Answer text (GitHub-flavored markdown with inline [A][B] citations)
    pub answer: String,
    /// Citations backing the answer
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Self-reported completeness
    pub confidence: Confidence,
    /// Whether the model asks for another retrieval round
    #[serde(default)]
    pub needs_more: bool,
    /// Topics the supplied evidence did not cover
    #[serde(default)]
    pub missing_topics: Vec<String>,
}

impl DocAnswer {
    /// Fixed response returned when retrieval produced no usable evidence
    pub fn insufficient() -> Self {
        Self {
            answer: "I could not find any relevant documentation to answer this question."
                .to_string(),
            citations: Vec::new(),
            confidence: Confidence::Insufficient,
            needs_more: false,
            missing_topics: vec!["No documentation found for this topic".to_string()],
        }
    }

    /// JSON schema the synthesis model output is constrained to
    pub fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "answer": { "type": "string" },
                "citations": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "key": { "type": "string" },
                            "relative_path": { "type": "string" },
                            "line_span": {
                                "type": ["object", "null"],
                                "properties": {
                                    "start": { "type": "integer" },
                                    "end": { "type": "integer" }
                                },
                                "required": ["start", "end"]
                            }
                        },
                        "required": ["key", "relative_path"]
                    }
                },
                "confidence": {
                    "type": "string",
                    "enum": ["high", "partial", "insufficient"]
                },
                "needs_more": { "type": "boolean" },
                "missing_topics": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["answer", "confidence", "needs_more", "missing_topics"]
        })
    }
}
