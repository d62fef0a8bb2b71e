//! Merges free-text search and structured filters into one predicate.
//!
//! # Invariants
//! - Zero active clauses build `Predicate::MatchAll`.
//! - Exactly one active clause is returned bare, without an `And` wrapper.
//! - Two or more clauses build one flat `And`; a multi-field free-text `Or`
//!   stays a single operand and is never flattened into it.

use crate::model::field::{FieldScope, SearchField};
use crate::search::predicate::Predicate;
use crate::search::sanitize::filter_pattern;

/// Per-request filter values as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Free-text term matched against `field`.
    pub search: Option<String>,
    pub field: FieldScope,
    pub disease: Option<String>,
    pub autoantibody: Option<String>,
    pub autoantigen: Option<String>,
    pub epitope: Option<String>,
}

impl FilterSet {
    /// Structured (per-field) filter values in dependency order.
    fn structured(&self) -> [(SearchField, Option<&str>); 4] {
        [
            (SearchField::Disease, self.disease.as_deref()),
            (SearchField::Autoantibody, self.autoantibody.as_deref()),
            (SearchField::Autoantigen, self.autoantigen.as_deref()),
            (SearchField::Epitope, self.epitope.as_deref()),
        ]
    }
}

/// Builds the composite predicate for `filters`.
pub fn build(filters: &FilterSet) -> Predicate {
    let mut clauses = Vec::new();

    if let Some(pattern) = filter_pattern(filters.search.as_deref()) {
        let clause = match filters.field {
            FieldScope::All => Predicate::any_field_contains(&pattern),
            FieldScope::Only(field) => Predicate::contains(field, pattern),
        };
        clauses.push(clause);
    }

    for (field, value) in filters.structured() {
        if let Some(pattern) = filter_pattern(value) {
            clauses.push(Predicate::contains(field, pattern));
        }
    }

    combine(clauses)
}

/// Applies the zero / one / many combination rule.
pub(crate) fn combine(mut clauses: Vec<Predicate>) -> Predicate {
    match clauses.len() {
        0 => Predicate::MatchAll,
        1 => clauses.remove(0),
        _ => Predicate::And(clauses),
    }
}
