//! End-to-end demo against a local Ollama server
//!
//! Run with: cargo run -p docqa --example answer -- "How do I configure retries?"

use std::sync::Arc;

use async_trait::async_trait;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docqa::config::QaConfig;
use docqa::providers::{
    OllamaClient, OllamaModel, OllamaPlanner, ScoreSumAggregator, SearchProvider,
};
use docqa::types::{LineSpan, RetrievalResult};
use docqa::{QaOrchestrator, Synthesizer};

/// Naive keyword search over embedded documentation snippets
///
/// Scores each snippet by the fraction of query terms it contains. Stands
/// in for a real vector search backend so the demo has no index to build.
struct KeywordSearch {
    corpus: Vec<RetrievalResult>,
}

impl KeywordSearch {
    fn demo_corpus() -> Self {
        let snippet = |path: &str, start: u32, end: u32, content: &str| RetrievalResult {
            relative_path: path.to_string(),
            line_span: Some(LineSpan::new(start, end)),
            score: 0.0,
            content: content.to_string(),
        };

        Self {
            corpus: vec![
                snippet(
                    "guides/http-client.md",
                    12,
                    34,
                    "Retries are configured per client with the `max_retries` \
                     setting in `client.toml`. The default is 2; set it to 0 \
                     to disable retries entirely.",
                ),
                snippet(
                    "guides/http-client.md",
                    36,
                    58,
                    "Retry backoff is exponential, starting at one second and \
                     doubling per attempt. Override the base delay with \
                     `retry_backoff_secs`.",
                ),
                snippet(
                    "guides/deployment.md",
                    1,
                    28,
                    "Deploy with `platform deploy --env staging`. Rollbacks \
                     use `platform rollback` and restore the previous release.",
                ),
                snippet(
                    "reference/config.md",
                    40,
                    72,
                    "All client settings live under the `[client]` table: \
                     `timeout_secs`, `max_retries`, `retry_backoff_secs`, and \
                     `base_url`.",
                ),
            ],
        }
    }
}

#[async_trait]
impl SearchProvider for KeywordSearch {
    async fn search(
        &self,
        query: &str,
        _namespace: &str,
        top_k: usize,
        min_score: f32,
    ) -> docqa::Result<Vec<RetrievalResult>> {
        let query = query.to_lowercase();
        let terms: Vec<&str> = query.split_whitespace().collect();

        let mut scored: Vec<RetrievalResult> = self
            .corpus
            .iter()
            .map(|snippet| {
                let content = snippet.content.to_lowercase();
                let hits = terms.iter().filter(|term| content.contains(*term)).count();
                RetrievalResult {
                    score: hits as f32 / terms.len().max(1) as f32,
                    ..snippet.clone()
                }
            })
            .filter(|snippet| snippet.score >= min_score)
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docqa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "How do I configure retries?".to_string());

    let mut config = QaConfig::default();
    // Keyword scores run lower than vector similarities.
    config.retrieval.min_score = 0.2;

    let client = Arc::new(OllamaClient::new(&config.llm)?);
    if !client.health_check().await? {
        anyhow::bail!(
            "Ollama is not reachable at {} (start it with `ollama serve`)",
            config.llm.base_url
        );
    }

    let planner = Arc::new(OllamaPlanner::new(Arc::clone(&client)));
    let model = Arc::new(OllamaModel::new(client));
    let synthesizer = Synthesizer::new(model, config.synthesis.clone());
    let orchestrator = QaOrchestrator::new(
        planner,
        Arc::new(KeywordSearch::demo_corpus()),
        Arc::new(ScoreSumAggregator),
        synthesizer,
        config,
    );

    let answer = orchestrator.answer(&question).await?;

    println!("\n{}\n", answer.answer);
    println!("Confidence: {:?}", answer.confidence);
    for citation in &answer.citations {
        println!("  {}", citation.format_key_map_line());
    }

    Ok(())
}
