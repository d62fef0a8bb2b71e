//! Listing result assembly: pagination, sorting and statistics.
//!
//! # Responsibility
//! - Normalize page/limit input and compute page metadata.
//! - Run a built predicate through storage as one page plus a total count.
//! - Aggregate optional statistics over the whole filtered set.
//!
//! # Invariants
//! - `page >= 1`, `1 <= limit <= LIST_LIMIT_MAX`.
//! - `total_pages = ceil(total / limit)`; zero matches means zero pages.
//! - Records are only read, never mutated.

use crate::model::field::{SearchField, SortSpec};
use crate::model::record::Record;
use crate::repo::storage::{RecordStorage, StorageResult};
use crate::search::predicate::Predicate;
use crate::search::query_builder::FilterSet;
use serde::Serialize;

pub const LIST_LIMIT_DEFAULT: u32 = 10;
pub const LIST_LIMIT_MAX: u32 = 100;

/// Normalizes a requested page number.
///
/// Missing, zero and negative values resolve to the first page.
pub fn normalize_page(requested: Option<i64>) -> u32 {
    match requested {
        Some(value) if value > 0 => u32::try_from(value).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Normalizes a requested page size.
///
/// Missing or zero values resolve to `default`; everything else is clamped to
/// `1..=max`.
pub fn normalize_limit(requested: Option<i64>, default: u32, max: u32) -> u32 {
    match requested {
        None | Some(0) => default,
        Some(value) => value.clamp(1, i64::from(max)) as u32,
    }
}

/// Listing request after parameter normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub filters: FilterSet,
    pub sort: SortSpec,
    pub page: u32,
    pub limit: u32,
    pub include_stats: bool,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            filters: FilterSet::default(),
            sort: SortSpec::default(),
            page: 1,
            limit: LIST_LIMIT_DEFAULT,
            include_stats: false,
        }
    }
}

/// Page metadata returned with every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageInfo {
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        let limit = limit.max(1);
        let total_pages = total.div_ceil(u64::from(limit));
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next_page: u64::from(page) < total_pages,
            has_prev_page: page > 1,
        }
    }

    /// Rows to skip before the current page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Distinct-value counts over a filtered record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingStats {
    pub total_records: u64,
    pub unique_diseases: u64,
    pub unique_autoantibodies: u64,
    pub unique_autoantigens: u64,
}

/// One assembled listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingPage {
    pub records: Vec<Record>,
    pub pagination: PageInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ListingStats>,
}

/// Executes `predicate` for `request` and assembles the page.
pub fn assemble_listing<S>(
    storage: &S,
    predicate: &Predicate,
    request: &ListRequest,
) -> StorageResult<ListingPage>
where
    S: RecordStorage + ?Sized,
{
    let limit = request.limit.clamp(1, LIST_LIMIT_MAX);
    let page = request.page.max(1);

    let total = storage.count(predicate)?;
    let pagination = PageInfo::new(total, page, limit);
    let records = storage.find(predicate, request.sort, pagination.skip(), limit)?;

    let stats = if request.include_stats {
        Some(listing_stats(storage, predicate, total)?)
    } else {
        None
    };

    Ok(ListingPage {
        records,
        pagination,
        stats,
    })
}

/// Counts distinct required-field values among records matching `predicate`.
pub fn listing_stats<S>(
    storage: &S,
    predicate: &Predicate,
    total: u64,
) -> StorageResult<ListingStats>
where
    S: RecordStorage + ?Sized,
{
    let distinct_count = |field: SearchField| -> StorageResult<u64> {
        Ok(storage.distinct(field, predicate)?.len() as u64)
    };

    Ok(ListingStats {
        total_records: total,
        unique_diseases: distinct_count(SearchField::Disease)?,
        unique_autoantibodies: distinct_count(SearchField::Autoantibody)?,
        unique_autoantigens: distinct_count(SearchField::Autoantigen)?,
    })
}
