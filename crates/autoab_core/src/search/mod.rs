//! Query composition and relevance ranking engine.
//!
//! # Responsibility
//! - Escape user values into literal patterns (`sanitize`).
//! - Merge free-text and field filters into one predicate (`query_builder`).
//! - Score and order ranked search candidates (`ranker`).
//! - Resolve cascading facet values (`facets`).
//!
//! # Invariants
//! - Every function here is pure over its inputs or reads through
//!   `RecordStorage` only; nothing holds state between calls.

pub mod facets;
pub mod predicate;
pub mod query_builder;
pub mod ranker;
pub mod sanitize;
