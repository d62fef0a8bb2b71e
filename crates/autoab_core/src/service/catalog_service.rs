//! Catalog query use-case service.
//!
//! # Responsibility
//! - Orchestrate query building, storage execution, ranking, facet
//!   resolution and result assembly behind one storage-agnostic facade.
//! - Emit metadata-only diagnostic events per use case.
//!
//! # Invariants
//! - The service holds no mutable state; every call is request-scoped.
//! - Validation failures never reach storage.
//! - Logged events carry lengths, counts and durations, never user text.

use crate::model::field::SearchField;
use crate::model::record::Record;
use crate::repo::storage::{RecordStorage, StorageError};
use crate::search::facets::{self, FacetRequest};
use crate::search::predicate::Predicate;
use crate::search::query_builder;
use crate::search::ranker::{self, RankingStats, ScoredRecord};
use crate::service::assembler::{assemble_listing, ListRequest, ListingPage, LIST_LIMIT_MAX};
use crate::service::export::export_csv;
use crate::service::params::{CatalogParams, RankedSearchRequest, ValidationError};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogError {
    /// Caller input violated a request rule.
    Validation(ValidationError),
    /// Storage-layer failure, passed through unchanged.
    Storage(StorageError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ValidationError> for CatalogError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StorageError> for CatalogError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<regex::Error> for CatalogError {
    fn from(value: regex::Error) -> Self {
        Self::Storage(StorageError::InvalidPattern(value))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Ranked search response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedSearchResult {
    /// Trimmed term the ranking ran for.
    pub query: String,
    pub hits: Vec<ScoredRecord>,
    /// Number of candidates before truncation.
    pub total_matches: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RankingStats>,
}

/// Catalog-wide summary counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOverview {
    pub total_records: u64,
    pub unique_diseases: u64,
    pub unique_autoantibodies: u64,
    pub unique_autoantigens: u64,
    pub unique_epitopes: u64,
    pub verified_records: u64,
}

/// Catalog facade over a [`RecordStorage`] implementation.
pub struct CatalogService<S: RecordStorage> {
    storage: S,
}

impl<S: RecordStorage> CatalogService<S> {
    /// Creates a service using the provided storage implementation.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Filtered, sorted, paginated listing.
    pub fn list(&self, request: &ListRequest) -> CatalogResult<ListingPage> {
        let started_at = Instant::now();
        let predicate = query_builder::build(&request.filters);

        let page = assemble_listing(&self.storage, &predicate, request).inspect_err(|err| {
            warn!("event=catalog_list module=service status=error error={err}");
        })?;

        debug!(
            "event=catalog_list module=service status=ok match_all={} total={} page={} limit={} returned={} duration_ms={}",
            predicate.is_match_all(),
            page.pagination.total,
            page.pagination.page,
            page.pagination.limit,
            page.records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(page)
    }

    /// Listing driven by flat transport parameters.
    pub fn list_with_params(&self, params: &CatalogParams) -> CatalogResult<ListingPage> {
        let request = params.list_request()?;
        self.list(&request)
    }

    /// Relevance-ranked search over all searchable fields.
    pub fn ranked_search(
        &self,
        request: &RankedSearchRequest,
    ) -> CatalogResult<RankedSearchResult> {
        let started_at = Instant::now();
        let Some(predicate) = ranker::candidate_predicate(&request.term) else {
            return Err(ValidationError::MissingSearchTerm.into());
        };

        let candidates = self.storage.aggregate_ranked(&predicate)?;
        let total_matches = candidates.len() as u64;
        let stats = request
            .include_stats
            .then(|| RankingStats::from_candidates(&candidates));
        let hits = ranker::rank(&request.term, candidates, request.limit)?;

        debug!(
            "event=catalog_ranked_search module=service status=ok term_chars={} candidates={} returned={} duration_ms={}",
            request.term.chars().count(),
            total_matches,
            hits.len(),
            started_at.elapsed().as_millis()
        );

        Ok(RankedSearchResult {
            query: request.term.clone(),
            hits,
            total_matches,
            stats,
        })
    }

    /// Ranked search driven by flat transport parameters.
    pub fn ranked_search_with_params(
        &self,
        params: &CatalogParams,
    ) -> CatalogResult<RankedSearchResult> {
        let request = params.ranked_request()?;
        self.ranked_search(&request)
    }

    /// Cascading facet values for a dependent selection widget.
    pub fn facet_values(&self, request: &FacetRequest) -> CatalogResult<Vec<String>> {
        let values = facets::resolve(&self.storage, request)?;
        debug!(
            "event=catalog_facets module=service status=ok target={} values={}",
            request.target.as_str(),
            values.len()
        );
        Ok(values)
    }

    /// CSV for every record matching the listing filters, in listing order.
    ///
    /// `page` and `limit` in `request` are ignored; storage is read in
    /// `LIST_LIMIT_MAX` chunks until the filtered total is reached.
    pub fn export_listing_csv(&self, request: &ListRequest) -> CatalogResult<String> {
        let started_at = Instant::now();
        let predicate = query_builder::build(&request.filters);
        let total = self.storage.count(&predicate)?;

        let mut records = Vec::new();
        while (records.len() as u64) < total {
            let chunk = self.storage.find(
                &predicate,
                request.sort,
                records.len() as u64,
                LIST_LIMIT_MAX,
            )?;
            if chunk.is_empty() {
                break;
            }
            records.extend(chunk);
        }

        debug!(
            "event=catalog_export module=service status=ok kind=listing total={} rows={} duration_ms={}",
            total,
            records.len(),
            started_at.elapsed().as_millis()
        );
        Ok(export_csv(&records))
    }

    /// CSV for ranked hits, in ranking order.
    pub fn export_ranked_csv(&self, request: &RankedSearchRequest) -> CatalogResult<String> {
        let result = self.ranked_search(request)?;
        Ok(export_csv(result.hits.iter().map(|hit| &hit.record)))
    }

    /// Summary counts over the whole catalog.
    pub fn overview(&self) -> CatalogResult<CatalogOverview> {
        let records = self.storage.aggregate_ranked(&Predicate::MatchAll)?;
        Ok(summarize(&records))
    }
}

fn summarize(records: &[Record]) -> CatalogOverview {
    let unique = |field: SearchField| -> u64 {
        records
            .iter()
            .map(|record| field.value_of(record).trim())
            .filter(|value| !value.is_empty())
            .collect::<HashSet<_>>()
            .len() as u64
    };

    CatalogOverview {
        total_records: records.len() as u64,
        unique_diseases: unique(SearchField::Disease),
        unique_autoantibodies: unique(SearchField::Autoantibody),
        unique_autoantigens: unique(SearchField::Autoantigen),
        unique_epitopes: unique(SearchField::Epitope),
        verified_records: records
            .iter()
            .filter(|record| record.metadata.verified)
            .count() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::{summarize, CatalogError, CatalogService};
    use crate::model::record::Record;
    use crate::repo::memory_store::MemoryRecordStore;
    use crate::service::params::{CatalogParams, ValidationError};

    #[test]
    fn summarize_counts_non_blank_values() {
        let mut verified = Record::new("SLE", "Anti-Sm", "Sm").with_epitope("  ");
        verified.metadata.verified = true;
        let records = vec![
            verified,
            Record::new("SLE", "Anti-dsDNA", "dsDNA").with_epitope("backbone"),
            Record::new("RA", "Anti-CCP", "CCP"),
        ];

        let overview = summarize(&records);
        assert_eq!(overview.total_records, 3);
        assert_eq!(overview.unique_diseases, 2);
        assert_eq!(overview.unique_epitopes, 1);
        assert_eq!(overview.verified_records, 1);
    }

    #[test]
    fn validation_errors_short_circuit() {
        let service = CatalogService::new(MemoryRecordStore::new());
        let err = service
            .ranked_search_with_params(&CatalogParams::from_pairs([("q", "x")]))
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::TermTooShort { .. })
        ));
    }
}
