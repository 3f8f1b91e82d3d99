//! Parallel retrieval fan-out and evidence merging

use futures::future::try_join_all;
use std::collections::HashSet;

use crate::error::Result;
use crate::providers::SearchProvider;
use crate::types::{LineSpan, RetrievalResult};

/// Run all queries against the corpus concurrently and flatten the batches
///
/// All queries are issued together and the call suspends until every one
/// completes; a failure in any query fails the whole batch. The flattened
/// output preserves query order. Order within one query's batch is the
/// provider's contract.
pub async fn parallel_retrieve(
    search: &dyn SearchProvider,
    queries: &[String],
    namespace: &str,
    top_k: usize,
    min_score: f32,
) -> Result<Vec<RetrievalResult>> {
    let batches = try_join_all(
        queries
            .iter()
            .map(|query| search.search(query, namespace, top_k, min_score)),
    )
    .await?;

    let results: Vec<RetrievalResult> = batches.into_iter().flatten().collect();
    tracing::debug!(
        "Retrieved {} results across {} queries",
        results.len(),
        queries.len()
    );
    Ok(results)
}

/// Remove duplicate evidence units, keeping the first occurrence
///
/// Identity is (source path, line span). An earlier entry is never
/// replaced by a later duplicate, even when the later one scores higher;
/// downstream consumers rely on the original evidence order.
pub fn deduplicate_results(results: Vec<RetrievalResult>) -> Vec<RetrievalResult> {
    let mut seen: HashSet<(String, Option<LineSpan>)> = HashSet::with_capacity(results.len());
    results
        .into_iter()
        .filter(|result| seen.insert((result.relative_path.clone(), result.line_span)))
        .collect()
}
