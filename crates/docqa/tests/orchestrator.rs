//! Orchestrator behavior tests with scripted collaborators

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use docqa::config::QaConfig;
use docqa::error::{Error, Result};
use docqa::providers::{
    ChunkAggregator, ModelPayload, QueryPlanner, ScoreSumAggregator, SearchProvider,
    StructuredModel,
};
use docqa::types::{
    Citation, Confidence, DocAnswer, DocumentGroup, LineSpan, PlanStrategy, QueryPlan,
    RetrievalResult,
};
use docqa::{QaOrchestrator, Synthesizer};

fn chunk(path: &str, start: u32, end: u32, score: f32, content: &str) -> RetrievalResult {
    RetrievalResult {
        relative_path: path.to_string(),
        line_span: Some(LineSpan::new(start, end)),
        score,
        content: content.to_string(),
    }
}

fn verdict(
    answer: &str,
    confidence: Confidence,
    needs_more: bool,
    missing_topics: &[&str],
) -> DocAnswer {
    DocAnswer {
        answer: answer.to_string(),
        citations: Vec::new(),
        confidence,
        needs_more,
        missing_topics: missing_topics.iter().map(|t| t.to_string()).collect(),
    }
}

/// Planner returning a fixed plan
struct FixedPlanner {
    plan: QueryPlan,
}

impl FixedPlanner {
    fn with_queries(queries: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            plan: QueryPlan {
                queries: queries.iter().map(|q| q.to_string()).collect(),
                strategy: PlanStrategy::Decomposition,
            },
        })
    }

    fn empty() -> Arc<Self> {
        Arc::new(Self {
            plan: QueryPlan {
                queries: Vec::new(),
                strategy: PlanStrategy::Direct,
            },
        })
    }
}

#[async_trait]
impl QueryPlanner for FixedPlanner {
    async fn plan(&self, _question: &str) -> Result<QueryPlan> {
        Ok(self.plan.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Search provider serving scripted per-query batches and recording calls
#[derive(Default)]
struct MapSearch {
    by_query: HashMap<String, Vec<RetrievalResult>>,
    calls: Mutex<Vec<String>>,
}

impl MapSearch {
    fn new(batches: &[(&str, Vec<RetrievalResult>)]) -> Arc<Self> {
        Arc::new(Self {
            by_query: batches
                .iter()
                .map(|(query, results)| (query.to_string(), results.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MapSearch {
    async fn search(
        &self,
        query: &str,
        _namespace: &str,
        _top_k: usize,
        _min_score: f32,
    ) -> Result<Vec<RetrievalResult>> {
        self.calls.lock().unwrap().push(query.to_string());
        Ok(self.by_query.get(query).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "map"
    }
}

/// Model serving scripted payloads in order and recording every invocation
struct ScriptedModel {
    responses: Mutex<Vec<ModelPayload>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    fn new(responses: Vec<ModelPayload>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn recorded_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredModel for ScriptedModel {
    async fn invoke(
        &self,
        system: &str,
        user: &str,
        _schema: &serde_json::Value,
    ) -> Result<ModelPayload> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user.to_string()));
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(Error::synthesis("no scripted response left"));
        }
        Ok(responses.remove(0))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Aggregator that always produces zero documents
struct NullAggregator;

#[async_trait]
impl ChunkAggregator for NullAggregator {
    async fn aggregate(
        &self,
        _chunks: &[RetrievalResult],
        _top_n: usize,
    ) -> Result<Vec<DocumentGroup>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "null"
    }
}

fn orchestrator(
    planner: Arc<dyn QueryPlanner>,
    search: Arc<dyn SearchProvider>,
    aggregator: Arc<dyn ChunkAggregator>,
    model: Arc<dyn StructuredModel>,
) -> QaOrchestrator {
    let config = QaConfig::default();
    let synthesizer = Synthesizer::new(model, config.synthesis.clone());
    QaOrchestrator::new(planner, search, aggregator, synthesizer, config)
}

#[tokio::test]
async fn empty_retrieval_short_circuits_without_synthesis() {
    let search = MapSearch::new(&[]);
    let model = ScriptedModel::new(Vec::new());

    let qa = orchestrator(
        FixedPlanner::with_queries(&["query one", "query two"]),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    let answer = qa.answer("anything at all?").await.unwrap();

    assert_eq!(answer, DocAnswer::insufficient());
    assert_eq!(answer.confidence, Confidence::Insufficient);
    assert!(!answer.needs_more);
    assert!(answer.citations.is_empty());
    assert_eq!(
        answer.missing_topics,
        vec!["No documentation found for this topic"]
    );
    assert_eq!(model.call_count(), 0);
    assert_eq!(search.recorded_calls().len(), 2);
}

#[tokio::test]
async fn confident_first_pass_stops_after_one_round() {
    let evidence = vec![chunk("guides/retries.md", 1, 20, 0.8, "retry settings")];
    let search = MapSearch::new(&[("q1", evidence.clone()), ("q2", Vec::new())]);
    let model = ScriptedModel::new(vec![ModelPayload::Answer(verdict(
        "All covered [A].",
        Confidence::High,
        false,
        &[],
    ))]);

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1", "q2"]),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    let answer = qa.answer("How do retries work?").await.unwrap();

    assert_eq!(answer.answer, "All covered [A].");
    assert_eq!(model.call_count(), 1);
    // Only the planned queries ran; no expansion queries were issued.
    assert_eq!(search.recorded_calls(), vec!["q1", "q2"]);
    // Citations were backfilled from the evidence handed to the call.
    assert_eq!(answer.citations.len(), 1);
    assert_eq!(answer.citations[0].key, "A");
    assert_eq!(answer.citations[0].relative_path, "guides/retries.md");
}

#[tokio::test]
async fn refinement_runs_exactly_once_and_returns_second_verdict() {
    let question = "How do I configure retries?";
    let search = MapSearch::new(&[
        ("q1", vec![chunk("a.md", 1, 10, 0.7, "alpha")]),
        (
            "retry backoff",
            vec![chunk("b.md", 1, 10, 0.6, "beta")],
        ),
    ]);
    // The second verdict still demands more; it must be returned as-is.
    let model = ScriptedModel::new(vec![
        ModelPayload::Answer(verdict(
            "first answer",
            Confidence::Partial,
            true,
            &["retry backoff"],
        )),
        ModelPayload::Answer(verdict(
            "second answer",
            Confidence::Partial,
            true,
            &["still missing"],
        )),
    ]);

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1"]),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    let answer = qa.answer(question).await.unwrap();

    assert_eq!(answer.answer, "second answer");
    assert!(answer.needs_more); // no third round despite this
    assert_eq!(model.call_count(), 2);

    let calls = search.recorded_calls();
    assert_eq!(
        calls,
        vec![
            "q1".to_string(),
            format!("{} retry backoff", question),
            "retry backoff".to_string(),
        ]
    );
}

#[tokio::test]
async fn expansion_queries_cap_at_first_three_topics() {
    let question = "How does auth work?";
    let search = MapSearch::new(&[("q1", vec![chunk("a.md", 1, 10, 0.7, "alpha")])]);
    let model = ScriptedModel::new(vec![
        ModelPayload::Answer(verdict(
            "first",
            Confidence::Partial,
            true,
            &["t1", "t2", "t3", "t4"],
        )),
        ModelPayload::Answer(verdict("second", Confidence::Partial, false, &[])),
    ]);

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1"]),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    qa.answer(question).await.unwrap();

    let calls = search.recorded_calls();
    assert_eq!(
        &calls[1..],
        &[
            format!("{} t1", question),
            "t1".to_string(),
            format!("{} t2", question),
            "t2".to_string(),
            format!("{} t3", question),
            "t3".to_string(),
        ]
    );
}

#[tokio::test]
async fn merged_evidence_is_deduplicated_before_resynthesis() {
    let original = chunk("a.md", 1, 10, 0.7, "uniq-alpha");
    let search = MapSearch::new(&[
        ("q1", vec![original.clone()]),
        // Expansion returns the same identity again plus one new chunk.
        (
            "missing topic",
            vec![
                chunk("a.md", 1, 10, 0.9, "uniq-alpha"),
                chunk("b.md", 5, 15, 0.6, "uniq-beta"),
            ],
        ),
    ]);
    let model = ScriptedModel::new(vec![
        ModelPayload::Answer(verdict(
            "first",
            Confidence::Partial,
            true,
            &["missing topic"],
        )),
        ModelPayload::Answer(verdict("final", Confidence::High, false, &[])),
    ]);

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1"]),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    let answer = qa.answer("question?").await.unwrap();
    assert_eq!(answer.answer, "final");

    let calls = model.recorded_calls();
    let (_, refined_user) = &calls[1];
    assert_eq!(refined_user.matches("uniq-alpha").count(), 1);
    assert_eq!(refined_user.matches("uniq-beta").count(), 1);
    // The refined system instruction carries the relaxed completeness bar.
    let (refined_system, _) = &calls[1];
    assert!(refined_system.contains("Refinement Mode"));
    let (first_system, _) = &calls[0];
    assert!(!first_system.contains("Refinement Mode"));
}

#[tokio::test]
async fn needs_more_without_topics_is_final() {
    let search = MapSearch::new(&[("q1", vec![chunk("a.md", 1, 10, 0.7, "alpha")])]);
    let model = ScriptedModel::new(vec![ModelPayload::Answer(verdict(
        "inconsistent verdict",
        Confidence::Partial,
        true,
        &[],
    ))]);

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1"]),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    let answer = qa.answer("question?").await.unwrap();

    assert_eq!(answer.answer, "inconsistent verdict");
    assert_eq!(model.call_count(), 1);
    assert_eq!(search.recorded_calls(), vec!["q1"]);
}

#[tokio::test]
async fn empty_plan_falls_back_to_raw_question() {
    let question = "What is a namespace?";
    let search = MapSearch::new(&[(
        question,
        vec![chunk("concepts.md", 1, 10, 0.9, "namespace docs")],
    )]);
    let model = ScriptedModel::new(vec![ModelPayload::Answer(verdict(
        "answered",
        Confidence::High,
        false,
        &[],
    ))]);

    let qa = orchestrator(
        FixedPlanner::empty(),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    let answer = qa.answer(question).await.unwrap();

    assert_eq!(answer.answer, "answered");
    assert_eq!(search.recorded_calls(), vec![question]);
}

#[tokio::test]
async fn raw_model_payload_is_coerced_and_backfilled() {
    let search = MapSearch::new(&[("q1", vec![chunk("a.md", 1, 10, 0.7, "alpha")])]);
    let model = ScriptedModel::new(vec![ModelPayload::Raw(serde_json::json!({
        "answer": "coerced [A]",
        "citations": [],
        "confidence": "high",
        "needs_more": false,
        "missing_topics": []
    }))]);

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1"]),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    let answer = qa.answer("question?").await.unwrap();

    assert_eq!(answer.answer, "coerced [A]");
    assert_eq!(answer.confidence, Confidence::High);
    assert_eq!(
        answer.citations,
        vec![Citation {
            key: "A".to_string(),
            relative_path: "a.md".to_string(),
            line_span: Some(LineSpan::new(1, 10)),
        }]
    );
}

#[tokio::test]
async fn synthesis_failure_propagates() {
    let search = MapSearch::new(&[("q1", vec![chunk("a.md", 1, 10, 0.7, "alpha")])]);
    // Non-coercible payload: missing the required confidence field.
    let model = ScriptedModel::new(vec![ModelPayload::Raw(serde_json::json!({
        "answer": "no verdict attached"
    }))]);

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1"]),
        search,
        Arc::new(ScoreSumAggregator),
        model,
    );

    let result = qa.answer("question?").await;
    assert!(matches!(result, Err(Error::Synthesis(_))));
}

#[tokio::test]
async fn zero_aggregated_documents_short_circuit() {
    let search = MapSearch::new(&[("q1", vec![chunk("a.md", 1, 10, 0.7, "alpha")])]);
    let model = ScriptedModel::new(Vec::new());

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1"]),
        search,
        Arc::new(NullAggregator),
        model.clone(),
    );

    let answer = qa.answer_with_documents("question?").await.unwrap();

    assert_eq!(answer, DocAnswer::insufficient());
    assert_eq!(model.call_count(), 0);
}

#[tokio::test]
async fn document_mode_refinement_reaggregates_combined_chunks() {
    let question = "How do I deploy?";
    let expansion_query = format!("{} rollback steps", question);
    let search = MapSearch::new(&[
        ("q1", vec![chunk("deploy.md", 1, 10, 0.7, "uniq-deploy")]),
        (
            expansion_query.as_str(),
            vec![chunk("rollback.md", 1, 10, 0.9, "uniq-rollback")],
        ),
    ]);
    let model = ScriptedModel::new(vec![
        ModelPayload::Answer(verdict(
            "first",
            Confidence::Partial,
            true,
            &["rollback steps"],
        )),
        ModelPayload::Answer(verdict("refined", Confidence::High, false, &[])),
    ]);

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1"]),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    let answer = qa.answer_with_documents(question).await.unwrap();
    assert_eq!(answer.answer, "refined");
    assert_eq!(model.call_count(), 2);

    // Re-aggregation ran over the combined chunk set: the refined call
    // saw both documents, ranked by score.
    let calls = model.recorded_calls();
    let (_, refined_user) = &calls[1];
    assert!(refined_user.contains("uniq-deploy"));
    assert!(refined_user.contains("uniq-rollback"));
    assert!(refined_user.contains("[A] = rollback.md"));
    assert!(refined_user.contains("[B] = deploy.md"));
}

#[tokio::test]
async fn scenario_partial_first_pass_refines_once() {
    let question = "How do I configure retries?";
    let initial = vec![
        chunk("config.md", 10, 30, 0.8, "retries are configured in"),
        chunk("faq.md", 5, 12, 0.5, "common retry questions"),
    ];
    let supplement = vec![chunk("backoff.md", 1, 18, 0.7, "backoff settings")];

    let expansion_query = format!("{} retry backoff configuration", question);
    let search = MapSearch::new(&[("q1", initial), (expansion_query.as_str(), supplement)]);
    let model = ScriptedModel::new(vec![
        ModelPayload::Answer(verdict(
            "partial answer [A]",
            Confidence::Partial,
            true,
            &["retry backoff configuration"],
        )),
        ModelPayload::Answer(verdict(
            "complete answer [A][C]",
            Confidence::High,
            false,
            &[],
        )),
    ]);

    let qa = orchestrator(
        FixedPlanner::with_queries(&["q1"]),
        search.clone(),
        Arc::new(ScoreSumAggregator),
        model.clone(),
    );

    let answer = qa.answer(question).await.unwrap();

    assert_eq!(answer.answer, "complete answer [A][C]");
    assert_eq!(answer.confidence, Confidence::High);
    assert_eq!(model.call_count(), 2);
    assert_eq!(
        search.recorded_calls(),
        vec![
            "q1".to_string(),
            format!("{} retry backoff configuration", question),
            "retry backoff configuration".to_string(),
        ]
    );
    // Final citations cover the merged evidence in first-seen order.
    assert_eq!(answer.citations.len(), 3);
    assert_eq!(answer.citations[0].relative_path, "config.md");
    assert_eq!(answer.citations[1].relative_path, "faq.md");
    assert_eq!(answer.citations[2].relative_path, "backoff.md");
}
