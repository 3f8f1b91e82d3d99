//! docqa: documentation question answering with multi-query retrieval,
//! evidence merging, and self-assessing answer synthesis
//!
//! The orchestrator plans search queries for a question, retrieves
//! evidence in parallel, asks a schema-constrained model for an answer
//! with a completeness verdict, and performs at most one refinement round
//! (query expansion, re-retrieval, merge, re-synthesis) before returning.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod providers;
pub mod retrieval;
pub mod synthesis;
pub mod types;

pub use config::QaConfig;
pub use error::{Error, Result};
pub use orchestrator::QaOrchestrator;
pub use synthesis::Synthesizer;
pub use types::{
    answer::{Citation, Confidence, DocAnswer},
    plan::{PlanStrategy, QueryPlan},
    retrieval::{DocumentGroup, LineSpan, RetrievalResult},
};
