//! Storage-independent composite predicates.
//!
//! # Responsibility
//! - Represent "match records where ..." as a small boolean tree.
//! - Provide an in-process matcher for stores that filter records in Rust.
//!
//! # Invariants
//! - `Contains` patterns are already escaped; they are matched
//!   case-insensitively as substrings.
//! - `And(vec![])` matches everything, `Or(vec![])` matches nothing.

use crate::model::field::SearchField;
use crate::model::record::Record;
use regex::{Regex, RegexBuilder};

/// Case-insensitive substring clause on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainsClause {
    pub field: SearchField,
    /// Escaped regex fragment (see `search::sanitize::escape`).
    pub pattern: String,
}

impl ContainsClause {
    pub fn new(field: SearchField, pattern: impl Into<String>) -> Self {
        Self {
            field,
            pattern: pattern.into(),
        }
    }
}

/// Composite query consumed by `RecordStorage` implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    MatchAll,
    Contains(ContainsClause),
    Or(Vec<Predicate>),
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn contains(field: SearchField, pattern: impl Into<String>) -> Self {
        Self::Contains(ContainsClause::new(field, pattern))
    }

    /// Disjunction of the same pattern across every searchable field.
    pub fn any_field_contains(pattern: &str) -> Self {
        Self::Or(
            SearchField::ALL
                .iter()
                .map(|field| Self::contains(*field, pattern))
                .collect(),
        )
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::MatchAll)
    }

    /// Compiles every clause into a reusable matcher.
    ///
    /// # Errors
    /// Returns the regex error for a clause that is not a valid pattern. This
    /// cannot happen for patterns produced through the sanitizer.
    pub fn compile(&self) -> Result<PredicateMatcher, regex::Error> {
        let node = match self {
            Self::MatchAll => MatcherNode::All,
            Self::Contains(clause) => {
                MatcherNode::Contains(clause.field, contains_regex(&clause.pattern)?)
            }
            Self::Or(children) => MatcherNode::Or(compile_children(children)?),
            Self::And(children) => MatcherNode::And(compile_children(children)?),
        };
        Ok(PredicateMatcher { node })
    }
}

/// Builds the case-insensitive regex used for every contains clause.
pub fn contains_regex(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn compile_children(children: &[Predicate]) -> Result<Vec<PredicateMatcher>, regex::Error> {
    children.iter().map(Predicate::compile).collect()
}

/// Compiled form of a [`Predicate`].
#[derive(Debug, Clone)]
pub struct PredicateMatcher {
    node: MatcherNode,
}

#[derive(Debug, Clone)]
enum MatcherNode {
    All,
    Contains(SearchField, Regex),
    Or(Vec<PredicateMatcher>),
    And(Vec<PredicateMatcher>),
}

impl PredicateMatcher {
    pub fn matches(&self, record: &Record) -> bool {
        match &self.node {
            MatcherNode::All => true,
            MatcherNode::Contains(field, regex) => regex.is_match(field.value_of(record)),
            MatcherNode::Or(children) => children.iter().any(|child| child.matches(record)),
            MatcherNode::And(children) => children.iter().all(|child| child.matches(record)),
        }
    }
}
