//! Retrieved evidence units and document-level groups

use serde::{Deserialize, Serialize};

/// Inclusive line range within a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineSpan {
    /// First line of the span
    pub start: u32,
    /// Last line of the span
    pub end: u32,
}

impl LineSpan {
    /// Create a new line span
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }
}

/// One retrieved evidence unit (a chunk or document fragment)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Source path relative to the corpus root
    pub relative_path: String,
    /// Line range covered by this unit (absent for whole-document units)
    pub line_span: Option<LineSpan>,
    /// Relevance score (higher is more relevant)
    pub score: f32,
    /// Raw text content
    pub content: String,
}

impl RetrievalResult {
    /// Identity used for deduplication: source path plus line span
    pub fn identity(&self) -> (&str, Option<LineSpan>) {
        (self.relative_path.as_str(), self.line_span)
    }
}

/// Chunks aggregated under one source document, ranked by combined relevance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentGroup {
    /// Source path shared by the contributing chunks
    pub relative_path: String,
    /// Aggregate relevance signal used for ranking
    pub score: f32,
    /// Contributing chunks in first-seen order
    pub chunks: Vec<RetrievalResult>,
}
