//! Query planner trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::QueryPlan;

/// Trait for turning a question into a set of search queries
///
/// Implementations:
/// - `OllamaPlanner`: model-backed planning via a local Ollama server
#[async_trait]
pub trait QueryPlanner: Send + Sync {
    /// Plan search queries for a question
    ///
    /// An empty plan is valid; the orchestrator falls back to the raw
    /// question. A planning failure propagates.
    async fn plan(&self, question: &str) -> Result<QueryPlan>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
