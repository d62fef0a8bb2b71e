//! Flat key/value request parameters.
//!
//! # Responsibility
//! - Turn transport-level parameters into typed listing, ranked-search and
//!   facet requests.
//! - Report rejected input as `ValidationError` naming the violated rule.
//!
//! # Invariants
//! - Parameter names are part of the external contract: `search`, `field`,
//!   `disease`, `autoantibody`, `autoantigen`, `epitope`, `sortBy`,
//!   `sortOrder`, `page`, `limit`, `q`, `includeStats`.
//! - A repeated key keeps its last value.
//! - Unknown keys are ignored.
//! - `page` and `limit` read the leading signed integer of their value
//!   (`2.5` is 2, `20abc` is 20); a value without leading digits is missing.

use crate::model::field::{FacetField, FieldScope, SortField, SortOrder, SortSpec};
use crate::search::facets::FacetRequest;
use crate::search::query_builder::FilterSet;
use crate::search::ranker::{MIN_TERM_CHARS, RANK_LIMIT_DEFAULT, RANK_LIMIT_MAX};
use crate::service::assembler::{
    normalize_limit, normalize_page, ListRequest, LIST_LIMIT_DEFAULT, LIST_LIMIT_MAX,
};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller input rejected before any storage access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Ranked search requires `q`.
    MissingSearchTerm,
    /// `q` is shorter than the minimum after trimming.
    TermTooShort { min_chars: usize, actual_chars: usize },
    /// `field` is not a searchable field or `all`.
    InvalidField(String),
    /// Facet target is not one of the cascading fields.
    InvalidFacetField(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSearchTerm => write!(f, "search term `q` is required"),
            Self::TermTooShort {
                min_chars,
                actual_chars,
            } => write!(
                f,
                "search term must be at least {min_chars} characters, got {actual_chars}"
            ),
            Self::InvalidField(value) => write!(
                f,
                "invalid field `{value}`; expected all|disease|autoantibody|autoantigen|epitope|uniprotId"
            ),
            Self::InvalidFacetField(value) => write!(
                f,
                "invalid facet field `{value}`; expected disease|autoantibody|autoantigen|epitope"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Ranked search input after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedSearchRequest {
    /// Trimmed term, at least `MIN_TERM_CHARS` characters.
    pub term: String,
    pub limit: u32,
    pub include_stats: bool,
}

impl RankedSearchRequest {
    /// Validates a raw term with the default limit and no statistics.
    pub fn new(term: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            term: validate_term(Some(term))?,
            limit: RANK_LIMIT_DEFAULT,
            include_stats: false,
        })
    }
}

/// Flat request parameters keyed by their external names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogParams {
    values: HashMap<String, String>,
}

impl CatalogParams {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn owned(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }

    fn integer(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(leading_integer)
    }

    fn include_stats(&self) -> bool {
        self.get("includeStats") == Some("true")
    }

    /// Free-text and structured filters.
    ///
    /// # Errors
    /// `InvalidField` when `field` is present but not recognized.
    pub fn filter_set(&self) -> Result<FilterSet, ValidationError> {
        let field = match self.get("field") {
            None => FieldScope::All,
            Some(value) => FieldScope::parse(value)
                .ok_or_else(|| ValidationError::InvalidField(value.to_string()))?,
        };

        Ok(FilterSet {
            search: self.owned("search"),
            field,
            disease: self.owned("disease"),
            autoantibody: self.owned("autoantibody"),
            autoantigen: self.owned("autoantigen"),
            epitope: self.owned("epitope"),
        })
    }

    /// Listing request: filters, whitelisted sort, normalized pagination.
    pub fn list_request(&self) -> Result<ListRequest, ValidationError> {
        Ok(ListRequest {
            filters: self.filter_set()?,
            sort: SortSpec {
                field: SortField::parse_or_default(self.get("sortBy")),
                order: SortOrder::parse_or_default(self.get("sortOrder")),
            },
            page: normalize_page(self.integer("page")),
            limit: normalize_limit(self.integer("limit"), LIST_LIMIT_DEFAULT, LIST_LIMIT_MAX),
            include_stats: self.include_stats(),
        })
    }

    /// Ranked search request from `q`, `limit` and `includeStats`.
    pub fn ranked_request(&self) -> Result<RankedSearchRequest, ValidationError> {
        Ok(RankedSearchRequest {
            term: validate_term(self.get("q"))?,
            limit: normalize_limit(self.integer("limit"), RANK_LIMIT_DEFAULT, RANK_LIMIT_MAX),
            include_stats: self.include_stats(),
        })
    }

    /// Facet request for `target` with upstream selections from the params.
    pub fn facet_request(&self, target: &str) -> Result<FacetRequest, ValidationError> {
        let target = FacetField::parse(target)
            .ok_or_else(|| ValidationError::InvalidFacetField(target.to_string()))?;

        Ok(FacetRequest {
            target,
            disease: self.owned("disease"),
            autoantibody: self.owned("autoantibody"),
            autoantigen: self.owned("autoantigen"),
        })
    }
}

fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong digit runs saturate; callers clamp anyway.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * magnitude)
}

fn validate_term(raw: Option<&str>) -> Result<String, ValidationError> {
    let term = raw.map(str::trim).unwrap_or("");
    if term.is_empty() {
        return Err(ValidationError::MissingSearchTerm);
    }

    let actual_chars = term.chars().count();
    if actual_chars < MIN_TERM_CHARS {
        return Err(ValidationError::TermTooShort {
            min_chars: MIN_TERM_CHARS,
            actual_chars,
        });
    }

    Ok(term.to_string())
}
