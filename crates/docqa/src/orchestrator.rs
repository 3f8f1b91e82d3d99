//! Adaptive retrieval-refinement orchestration

use std::sync::Arc;

use crate::config::QaConfig;
use crate::error::Result;
use crate::providers::{ChunkAggregator, QueryPlanner, SearchProvider};
use crate::retrieval::{deduplicate_results, parallel_retrieve};
use crate::synthesis::Synthesizer;
use crate::types::DocAnswer;

/// Number of missing topics expanded into refinement queries
const MAX_EXPANSION_TOPICS: usize = 3;

/// Question-answering orchestrator with one bounded refinement round
///
/// Control flow: plan queries, retrieve in parallel, synthesize, and stop
/// there unless the verdict asks for more evidence and names missing
/// topics. In that case the query set is expanded, retrieval and synthesis
/// run once more, and the refined verdict is returned unconditionally:
/// honoring a second "needs more" signal would let query expansion cycle
/// against the retrieval backend without bound.
pub struct QaOrchestrator {
    planner: Arc<dyn QueryPlanner>,
    search: Arc<dyn SearchProvider>,
    aggregator: Arc<dyn ChunkAggregator>,
    synthesizer: Synthesizer,
    config: QaConfig,
}

impl QaOrchestrator {
    /// Create a new orchestrator from its collaborators
    pub fn new(
        planner: Arc<dyn QueryPlanner>,
        search: Arc<dyn SearchProvider>,
        aggregator: Arc<dyn ChunkAggregator>,
        synthesizer: Synthesizer,
        config: QaConfig,
    ) -> Self {
        Self {
            planner,
            search,
            aggregator,
            synthesizer,
            config,
        }
    }

    /// Answer a question against chunk-level evidence
    pub async fn answer(&self, question: &str) -> Result<DocAnswer> {
        let retrieval = &self.config.retrieval;
        tracing::info!("Processing question: {}", question);

        let queries = self.plan_queries(question).await?;
        let results = parallel_retrieve(
            self.search.as_ref(),
            &queries,
            &retrieval.namespace,
            retrieval.top_k,
            retrieval.min_score,
        )
        .await?;

        if results.is_empty() {
            tracing::info!("No evidence retrieved, returning insufficient answer");
            return Ok(DocAnswer::insufficient());
        }

        let answer = self.synthesizer.synthesize(question, &results, false).await?;
        tracing::info!(
            "First synthesis: confidence={:?}, needs_more={}, citations={}",
            answer.confidence,
            answer.needs_more,
            answer.citations.len()
        );

        if !wants_refinement(&answer) {
            return Ok(answer);
        }

        tracing::info!("Refinement needed for: {:?}", answer.missing_topics);
        let refinement_queries = expansion_queries(question, &answer.missing_topics);
        let additional = parallel_retrieve(
            self.search.as_ref(),
            &refinement_queries,
            &retrieval.namespace,
            retrieval.top_k,
            retrieval.min_score,
        )
        .await?;
        let new_count = additional.len();

        let mut combined = results;
        combined.extend(additional);
        let merged = deduplicate_results(combined);
        tracing::info!(
            "Refinement retrieved {} new chunks, merged to {} total",
            new_count,
            merged.len()
        );

        let refined = self.synthesizer.synthesize(question, &merged, true).await?;
        tracing::info!(
            "Refined synthesis: confidence={:?}, needs_more={}, citations={}",
            refined.confidence,
            refined.needs_more,
            refined.citations.len()
        );
        Ok(refined)
    }

    /// Answer a question against document-level evidence
    ///
    /// Chunks are aggregated into ranked document groups before synthesis;
    /// the refinement round re-aggregates from the full combined chunk set
    /// rather than merging document groups, so group membership and
    /// ranking may shift versus the first pass.
    pub async fn answer_with_documents(&self, question: &str) -> Result<DocAnswer> {
        let retrieval = &self.config.retrieval;
        tracing::info!("Processing question (document mode): {}", question);

        let queries = self.plan_queries(question).await?;
        let chunk_results = parallel_retrieve(
            self.search.as_ref(),
            &queries,
            &retrieval.namespace,
            retrieval.top_k,
            retrieval.min_score,
        )
        .await?;

        let documents = self
            .aggregator
            .aggregate(&chunk_results, retrieval.top_documents)
            .await?;
        if documents.is_empty() {
            tracing::info!("No documents aggregated, returning insufficient answer");
            return Ok(DocAnswer::insufficient());
        }

        let answer = self
            .synthesizer
            .synthesize_documents(question, &documents, false)
            .await?;
        tracing::info!(
            "First synthesis: confidence={:?}, needs_more={}, documents={}",
            answer.confidence,
            answer.needs_more,
            documents.len()
        );

        if !wants_refinement(&answer) {
            return Ok(answer);
        }

        tracing::info!("Refinement needed for: {:?}", answer.missing_topics);
        let refinement_queries = expansion_queries(question, &answer.missing_topics);
        let additional = parallel_retrieve(
            self.search.as_ref(),
            &refinement_queries,
            &retrieval.namespace,
            retrieval.top_k,
            retrieval.min_score,
        )
        .await?;

        let mut combined = chunk_results;
        combined.extend(additional);
        let merged_documents = self
            .aggregator
            .aggregate(&combined, retrieval.top_documents)
            .await?;
        if merged_documents.is_empty() {
            // The combined set is a superset of the first pass, so this
            // only happens with a non-conforming aggregator.
            tracing::warn!("Re-aggregation produced no documents, keeping first-pass answer");
            return Ok(answer);
        }
        tracing::info!(
            "Refinement aggregated {} total documents",
            merged_documents.len()
        );

        let refined = self
            .synthesizer
            .synthesize_documents(question, &merged_documents, true)
            .await?;
        Ok(refined)
    }

    /// Plan the initial query set, falling back to the raw question when
    /// planning yields an empty list
    async fn plan_queries(&self, question: &str) -> Result<Vec<String>> {
        let plan = self.planner.plan(question).await?;
        tracing::info!(
            "Planned {} queries with strategy {:?}",
            plan.queries.len(),
            plan.strategy
        );

        if plan.queries.is_empty() {
            tracing::warn!("Planner returned no queries, falling back to the raw question");
            return Ok(vec![question.to_string()]);
        }
        Ok(plan.queries)
    }
}

/// Whether a verdict triggers the single refinement round
fn wants_refinement(answer: &DocAnswer) -> bool {
    if !answer.needs_more {
        return false;
    }
    if answer.missing_topics.is_empty() {
        // Inconsistent verdict: nothing actionable to expand on.
        tracing::warn!("Model signaled needs_more without missing topics, treating answer as final");
        return false;
    }
    true
}

/// Build the refinement query set from the first missing topics
///
/// Each topic contributes a question-qualified query immediately followed
/// by the bare topic, preserving topic order.
fn expansion_queries(question: &str, missing_topics: &[String]) -> Vec<String> {
    let mut queries = Vec::with_capacity(MAX_EXPANSION_TOPICS * 2);
    for topic in missing_topics.iter().take(MAX_EXPANSION_TOPICS) {
        queries.push(format!("{} {}", question, topic));
        queries.push(topic.clone());
    }
    queries
}
