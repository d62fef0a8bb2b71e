#![allow(dead_code)]

use autoab_core::{MemoryRecordStore, Record, RecordWriter, SqliteRecordStore};
use chrono::{TimeZone, Utc};
use rusqlite::Connection;

/// Small curated catalog shared by integration tests.
pub fn sample_records() -> Vec<Record> {
    let mut records = vec![
        Record::new("Systemic lupus erythematosus (SLE)", "Anti-dsDNA", "Double-stranded DNA")
            .with_epitope("Phosphate backbone")
            .with_uniprot_id("Multiple"),
        Record::new("Systemic lupus erythematosus (SLE)", "Anti-Sm", "Smith antigen")
            .with_epitope("SmD1 C-terminal")
            .with_uniprot_id("P62314"),
        Record::new("Systemic lupus erythematosus (SLE)", "Anti-C1q", "C1q (complement)")
            .with_uniprot_id("P02745"),
        Record::new("Sjogren syndrome", "Anti-SSA/Ro60", "Ro60")
            .with_epitope("Ro60 residues 169-190")
            .with_uniprot_id("P10155"),
        Record::new("Sjogren syndrome", "Anti-SSB/La", "La protein").with_uniprot_id("P05455"),
        Record::new("Rheumatoid arthritis", "Anti-CCP", "Citrullinated peptides"),
        Record::new("Myasthenia gravis", "Anti-AChR", "Acetylcholine receptor")
            .with_epitope("Main immunogenic region")
            .with_uniprot_id("P02708"),
        Record::new("Overlap syndrome", "Anti-Lupus anticoagulant", "Phospholipids"),
    ];

    for (day, record) in records.iter_mut().enumerate() {
        let stamp = Utc
            .with_ymd_and_hms(2024, 1, 1 + day as u32, 12, 0, 0)
            .unwrap();
        record.metadata.date_added = stamp;
        record.metadata.last_updated = stamp;
        record.metadata.verified = day % 2 == 0;
    }
    records
}

pub fn memory_store(records: &[Record]) -> MemoryRecordStore {
    let mut store = MemoryRecordStore::new();
    let report = store.import_records(records);
    assert!(report.failed.is_empty(), "fixture import failed: {report:?}");
    store
}

pub fn sqlite_conn(records: &[Record]) -> Connection {
    let conn = autoab_core::db::open_db_in_memory().unwrap();
    let report = SqliteRecordStore::new(&conn).import_records(records);
    assert!(report.failed.is_empty(), "fixture import failed: {report:?}");
    conn
}
