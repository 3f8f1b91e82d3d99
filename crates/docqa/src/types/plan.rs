//! Query planning types

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Expansion approach chosen by the query planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStrategy {
    /// Single query, essentially the raw question
    #[default]
    Direct,
    /// Question split into independent sub-questions
    Decomposition,
    /// Same intent reworded with alternative vocabulary
    Rephrasing,
    /// Question broadened with related terminology
    Expansion,
}

/// Search queries planned for one question
///
/// Duplicate queries are tolerated; retrieval deduplicates their results
/// downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Ordered query strings
    pub queries: Vec<String>,
    /// Label describing the expansion approach
    #[serde(default)]
    pub strategy: PlanStrategy,
}

impl QueryPlan {
    /// Plan that passes the raw question through as the only query
    pub fn direct(question: impl Into<String>) -> Self {
        Self {
            queries: vec![question.into()],
            strategy: PlanStrategy::Direct,
        }
    }

    /// JSON schema constraining a planner model's output
    pub fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "queries": {
                    "type": "array",
                    "items": { "type": "string" }
                },
                "strategy": {
                    "type": "string",
                    "enum": ["direct", "decomposition", "rephrasing", "expansion"]
                }
            },
            "required": ["queries", "strategy"]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_plan() {
        let plan = QueryPlan::direct("How do I configure retries?");
        assert_eq!(plan.queries, vec!["How do I configure retries?"]);
        assert_eq!(plan.strategy, PlanStrategy::Direct);
    }

    #[test]
    fn test_strategy_wire_format() {
        let plan: QueryPlan =
            serde_json::from_str(r#"{"queries": ["a"], "strategy": "decomposition"}"#).unwrap();
        assert_eq!(plan.strategy, PlanStrategy::Decomposition);

        // Strategy falls back to direct when omitted
        let plan: QueryPlan = serde_json::from_str(r#"{"queries": ["a"]}"#).unwrap();
        assert_eq!(plan.strategy, PlanStrategy::Direct);
    }
}
