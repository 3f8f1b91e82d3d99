//! Data model for the QA pipeline
//!
//! All entities are created fresh per question-answering call; nothing
//! persists beyond the call.

pub mod answer;
pub mod plan;
pub mod retrieval;

pub use answer::{Citation, Confidence, DocAnswer};
pub use plan::{PlanStrategy, QueryPlan};
pub use retrieval::{DocumentGroup, LineSpan, RetrievalResult};
