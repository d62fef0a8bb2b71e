//! Weighted relevance ranking for free-text catalog search.
//!
//! # Responsibility
//! - Score candidate records by which fields contain the search term.
//! - Order scored records deterministically and cap the result size.
//!
//! # Invariants
//! - Score is the exact sum of per-field weights (10/8/6/4/2).
//! - Ordering is score descending, then `disease` ascending, then record id;
//!   storage order never leaks into the result.
//! - Statistics always describe the full candidate set, not the returned page.

use crate::model::field::SearchField;
use crate::model::record::Record;
use crate::search::predicate::{contains_regex, Predicate};
use crate::search::sanitize::filter_pattern;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

/// Minimum trimmed term length accepted for ranked search.
pub const MIN_TERM_CHARS: usize = 2;
pub const RANK_LIMIT_DEFAULT: u32 = 50;
pub const RANK_LIMIT_MAX: u32 = 100;

/// Relevance weight contributed when `field` contains the term.
pub fn field_weight(field: SearchField) -> u32 {
    match field {
        SearchField::Disease => 10,
        SearchField::Autoantibody => 8,
        SearchField::Autoantigen => 6,
        SearchField::Epitope => 4,
        SearchField::UniprotId => 2,
    }
}

/// Record paired with its relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: Record,
    pub score: u32,
}

/// Aggregates over every record matching the ranked term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingStats {
    pub total_matches: u64,
    pub unique_diseases: u64,
    pub unique_autoantibodies: u64,
    pub unique_autoantigens: u64,
}

impl RankingStats {
    pub fn from_candidates(candidates: &[Record]) -> Self {
        let mut diseases = HashSet::new();
        let mut autoantibodies = HashSet::new();
        let mut autoantigens = HashSet::new();
        for record in candidates {
            diseases.insert(record.disease.as_str());
            autoantibodies.insert(record.autoantibody.as_str());
            autoantigens.insert(record.autoantigen.as_str());
        }

        Self {
            total_matches: candidates.len() as u64,
            unique_diseases: diseases.len() as u64,
            unique_autoantibodies: autoantibodies.len() as u64,
            unique_autoantigens: autoantigens.len() as u64,
        }
    }
}

/// Predicate selecting ranking candidates: the term in any searchable field.
///
/// Returns `None` for a blank term.
pub fn candidate_predicate(term: &str) -> Option<Predicate> {
    filter_pattern(Some(term)).map(|pattern| Predicate::any_field_contains(&pattern))
}

/// Scores one record against a compiled term matcher.
pub fn score(record: &Record, term: &Regex) -> u32 {
    SearchField::ALL
        .iter()
        .filter(|field| term.is_match(field.value_of(record)))
        .map(|field| field_weight(*field))
        .sum()
}

/// Scores, orders and truncates `candidates` for `term`.
///
/// `limit` is clamped to `1..=RANK_LIMIT_MAX`. A blank term yields no hits.
///
/// # Errors
/// Returns the regex error if the escaped term cannot be compiled (only
/// possible for pathologically large input).
pub fn rank(
    term: &str,
    candidates: Vec<Record>,
    limit: u32,
) -> Result<Vec<ScoredRecord>, regex::Error> {
    let Some(pattern) = filter_pattern(Some(term)) else {
        return Ok(Vec::new());
    };
    let matcher = contains_regex(&pattern)?;

    let mut scored = candidates
        .into_iter()
        .map(|record| {
            let score = score(&record, &matcher);
            ScoredRecord { record, score }
        })
        .filter(|hit| hit.score > 0)
        .collect::<Vec<_>>();

    scored.sort_by(|left, right| {
        right
            .score
            .cmp(&left.score)
            .then_with(|| left.record.disease.cmp(&right.record.disease))
            .then_with(|| left.record.id.cmp(&right.record.id))
    });
    scored.truncate(limit.clamp(1, RANK_LIMIT_MAX) as usize);

    Ok(scored)
}
