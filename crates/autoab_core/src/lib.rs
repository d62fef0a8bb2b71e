//! Query composition and relevance ranking for the autoantibody catalog.
//! This crate is the single source of truth for search semantics.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogSink, LoggingError,
};
pub use model::field::{FacetField, FieldScope, SearchField, SortField, SortOrder, SortSpec};
pub use model::record::{Record, RecordId, RecordMetadata, RecordValidationError};
pub use repo::memory_store::MemoryRecordStore;
pub use repo::sqlite_store::SqliteRecordStore;
pub use repo::storage::{
    ImportFailure, ImportReport, RecordStorage, RecordWriter, StorageError, StorageResult,
};
pub use search::facets::FacetRequest;
pub use search::predicate::Predicate;
pub use search::query_builder::FilterSet;
pub use search::ranker::{RankingStats, ScoredRecord};
pub use service::assembler::{ListRequest, ListingPage, ListingStats, PageInfo};
pub use service::catalog_service::{
    CatalogError, CatalogOverview, CatalogResult, CatalogService, RankedSearchResult,
};
pub use service::export::{export_csv, CSV_HEADER};
pub use service::params::{CatalogParams, RankedSearchRequest, ValidationError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
