//! Chunk-to-document aggregation

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::Result;
use crate::types::{DocumentGroup, RetrievalResult};

/// Trait for grouping chunk results into ranked document-level groups
///
/// Must be idempotent given identical inputs. Implementations that need a
/// shared document workspace hold that handle internally; it is injected
/// at construction and never mutated through this trait.
#[async_trait]
pub trait ChunkAggregator: Send + Sync {
    /// Group chunks by source document, rank the groups by an aggregate
    /// relevance signal, and truncate to `top_n`
    async fn aggregate(
        &self,
        chunks: &[RetrievalResult],
        top_n: usize,
    ) -> Result<Vec<DocumentGroup>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// In-memory aggregator ranking documents by summed chunk scores
///
/// Groups form in first-seen order; ties keep that order after the stable
/// sort.
pub struct ScoreSumAggregator;

#[async_trait]
impl ChunkAggregator for ScoreSumAggregator {
    async fn aggregate(
        &self,
        chunks: &[RetrievalResult],
        top_n: usize,
    ) -> Result<Vec<DocumentGroup>> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, DocumentGroup> = HashMap::new();

        for chunk in chunks {
            let group = groups
                .entry(chunk.relative_path.clone())
                .or_insert_with(|| {
                    order.push(chunk.relative_path.clone());
                    DocumentGroup {
                        relative_path: chunk.relative_path.clone(),
                        score: 0.0,
                        chunks: Vec::new(),
                    }
                });
            group.score += chunk.score;
            group.chunks.push(chunk.clone());
        }

        let mut ranked: Vec<DocumentGroup> = order
            .into_iter()
            .filter_map(|path| groups.remove(&path))
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_n);

        Ok(ranked)
    }

    fn name(&self) -> &str {
        "score-sum"
    }
}
