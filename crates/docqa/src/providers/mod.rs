//! Provider abstractions for query planning, corpus search, aggregation,
//! and schema-constrained model calls
//!
//! Trait-based seams let the orchestrator run against a local Ollama
//! server, a cloud backend, or test doubles.

pub mod aggregator;
pub mod model;
pub mod ollama;
pub mod planner;
pub mod search;

pub use aggregator::{ChunkAggregator, ScoreSumAggregator};
pub use model::{ModelPayload, StructuredModel};
pub use ollama::{OllamaClient, OllamaModel, OllamaPlanner};
pub use planner::QueryPlanner;
pub use search::SearchProvider;
