//! Storage contracts consumed by the search engine.
//!
//! # Responsibility
//! - Define the narrow read interface (`find`, `count`, `distinct`,
//!   `aggregate_ranked`) the engine runs predicates through.
//! - Define the write interface used by bulk import.
//!
//! # Invariants
//! - Implementations must agree on predicate semantics: case-insensitive
//!   substring match, absent optional fields read as `""`.
//! - `find` orders by the sort key and then by record id, so equal keys never
//!   fall back to insertion order.
//! - Bulk import never aborts on a single bad record.

use crate::db::DbError;
use crate::model::field::{SearchField, SortSpec};
use crate::model::record::{Record, RecordId, RecordValidationError};
use crate::search::predicate::Predicate;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer failure, propagated to callers unchanged.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    /// Record rejected by `Record::validate()` on write.
    Validation(RecordValidationError),
    /// Persisted row cannot be decoded into a valid record.
    InvalidData(String),
    /// Predicate pattern failed to compile.
    InvalidPattern(regex::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
            Self::InvalidPattern(err) => write!(f, "invalid predicate pattern: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::InvalidPattern(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RecordValidationError> for StorageError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<regex::Error> for StorageError {
    fn from(value: regex::Error) -> Self {
        Self::InvalidPattern(value)
    }
}

/// Read interface the engine executes predicates against.
pub trait RecordStorage {
    /// Returns matching records ordered by `sort`, skipping `skip` rows and
    /// returning at most `limit`.
    fn find(
        &self,
        predicate: &Predicate,
        sort: SortSpec,
        skip: u64,
        limit: u32,
    ) -> StorageResult<Vec<Record>>;

    /// Counts matching records.
    fn count(&self, predicate: &Predicate) -> StorageResult<u64>;

    /// Raw distinct values of `field` over matching records.
    ///
    /// Absent values are skipped; blank values may be returned.
    fn distinct(&self, field: SearchField, predicate: &Predicate) -> StorageResult<Vec<String>>;

    /// Every matching record, unordered; ranking happens in-process.
    fn aggregate_ranked(&self, predicate: &Predicate) -> StorageResult<Vec<Record>>;
}

/// One rejected record in a bulk import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    /// Zero-based position in the submitted batch.
    pub index: usize,
    pub reason: String,
}

/// Outcome of a partially successful bulk import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub failed: Vec<ImportFailure>,
}

/// Write interface used by import paths.
pub trait RecordWriter {
    /// Validates and stores one record, returning its assigned id.
    fn insert_record(&mut self, record: &Record) -> StorageResult<RecordId>;

    /// Inserts each record independently, collecting per-record failures.
    fn import_records(&mut self, records: &[Record]) -> ImportReport {
        let mut report = ImportReport::default();
        for (index, record) in records.iter().enumerate() {
            match self.insert_record(record) {
                Ok(_) => report.inserted += 1,
                Err(err) => report.failed.push(ImportFailure {
                    index,
                    reason: err.to_string(),
                }),
            }
        }
        report
    }
}
