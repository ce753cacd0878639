//! Grounding of semantic test parameters
//!
//! Parameters whose generator is `SemanticParameter` get their `values`
//! filled from a remote knowledge base. Each parameter is queried on its own;
//! a failed query leaves that parameter empty and grounding moves on.

mod adapter;
mod query;
mod sparql;

pub use adapter::{GroundingAdapter, GroundingReport, ParameterOutcome, sink_path};
pub use query::{PREDICATES_PARAM, PredicateQueryBuilder, QueryBuilder, VALUES_PARAM};
pub use sparql::{KnowledgeBase, SparqlEndpoint};
