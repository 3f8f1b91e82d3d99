//! Corpus search provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RetrievalResult;

/// Trait for retrieving evidence for a single query
///
/// The orchestrator fans out one call per planned query; see
/// `retrieval::parallel_retrieve`.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search one namespace for a single query
    ///
    /// Returns at most `top_k` results scoring at least `min_score`.
    /// Order within the batch is the provider's contract.
    async fn search(
        &self,
        query: &str,
        namespace: &str,
        top_k: usize,
        min_score: f32,
    ) -> Result<Vec<RetrievalResult>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
