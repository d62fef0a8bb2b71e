//! In-process record store.
//!
//! # Responsibility
//! - Hold records in a `Vec` and evaluate predicates with compiled regexes.
//! - Serve as the reference engine that SQLite results are compared against.
//!
//! # Invariants
//! - Ids are assigned on insert and never reused.
//! - Sorting matches SQLite: text keys compare bytewise with absent values as
//!   `""`, ties resolve by record id.

use crate::model::field::{SearchField, SortField, SortOrder, SortSpec};
use crate::model::record::{Record, RecordId};
use crate::repo::storage::{RecordStorage, RecordWriter, StorageResult};
use crate::search::predicate::Predicate;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use uuid::Uuid;

/// `Vec`-backed implementation of [`RecordStorage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    records: Vec<Record>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records, assigning fresh ids.
    pub fn from_records<I>(records: I) -> StorageResult<Self>
    where
        I: IntoIterator<Item = Record>,
    {
        let mut store = Self::new();
        for record in records {
            store.insert_record(&record)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn matching(&self, predicate: &Predicate) -> StorageResult<Vec<&Record>> {
        if predicate.is_match_all() {
            return Ok(self.records.iter().collect());
        }
        let matcher = predicate.compile()?;
        Ok(self
            .records
            .iter()
            .filter(|record| matcher.matches(record))
            .collect())
    }
}

impl RecordStorage for MemoryRecordStore {
    fn find(
        &self,
        predicate: &Predicate,
        sort: SortSpec,
        skip: u64,
        limit: u32,
    ) -> StorageResult<Vec<Record>> {
        let mut matched = self.matching(predicate)?;
        matched.sort_by(|left, right| compare_for_sort(left, right, sort));

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .skip(skip)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn count(&self, predicate: &Predicate) -> StorageResult<u64> {
        Ok(self.matching(predicate)?.len() as u64)
    }

    fn distinct(&self, field: SearchField, predicate: &Predicate) -> StorageResult<Vec<String>> {
        let values = self
            .matching(predicate)?
            .into_iter()
            .filter_map(|record| present_value(record, field))
            .map(str::to_string)
            .collect::<BTreeSet<_>>();
        Ok(values.into_iter().collect())
    }

    fn aggregate_ranked(&self, predicate: &Predicate) -> StorageResult<Vec<Record>> {
        Ok(self.matching(predicate)?.into_iter().cloned().collect())
    }
}

impl RecordWriter for MemoryRecordStore {
    fn insert_record(&mut self, record: &Record) -> StorageResult<RecordId> {
        let mut stored = record.clone();
        stored.normalize_optional_fields();
        stored.validate()?;

        stored.id = Uuid::new_v4();
        let id = stored.id;
        self.records.push(stored);
        Ok(id)
    }
}

fn present_value(record: &Record, field: SearchField) -> Option<&str> {
    match field {
        SearchField::Epitope => record.epitope.as_deref(),
        SearchField::UniprotId => record.uniprot_id.as_deref(),
        other => Some(other.value_of(record)),
    }
}

fn compare_for_sort(left: &Record, right: &Record, sort: SortSpec) -> Ordering {
    let by_key = match sort.field {
        SortField::Disease => left.disease.cmp(&right.disease),
        SortField::Autoantibody => left.autoantibody.cmp(&right.autoantibody),
        SortField::Autoantigen => left.autoantigen.cmp(&right.autoantigen),
        SortField::Epitope => SearchField::Epitope
            .value_of(left)
            .cmp(SearchField::Epitope.value_of(right)),
        SortField::UniprotId => SearchField::UniprotId
            .value_of(left)
            .cmp(SearchField::UniprotId.value_of(right)),
        SortField::CreatedAt => left
            .metadata
            .date_added
            .timestamp_millis()
            .cmp(&right.metadata.date_added.timestamp_millis()),
        SortField::UpdatedAt => left
            .metadata
            .last_updated
            .timestamp_millis()
            .cmp(&right.metadata.last_updated.timestamp_millis()),
    };
    let by_key = match sort.order {
        SortOrder::Asc => by_key,
        SortOrder::Desc => by_key.reverse(),
    };
    by_key.then_with(|| left.id.cmp(&right.id))
}
