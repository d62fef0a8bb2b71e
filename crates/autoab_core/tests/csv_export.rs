mod common;

use autoab_core::{CatalogParams, CatalogService, Record, SqliteRecordStore, CSV_HEADER};
use common::{memory_store, sample_records, sqlite_conn};

/// Minimal RFC 4180 reader for checking exported text.
fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match (quoted, ch) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (true, '"') => quoted = false,
            (true, other) => field.push(other),
            (false, '"') => quoted = true,
            (false, ',') => row.push(std::mem::take(&mut field)),
            (false, '\n') => {
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            (false, other) => field.push(other),
        }
    }
    row.push(field);
    rows.push(row);
    rows
}

fn awkward_records() -> Vec<Record> {
    let mut records = sample_records();
    records.push(
        Record::new("Lupus, drug-induced", "Anti-histone", "Histone H2A-H2B \"dimer\"")
            .with_epitope("N-terminal tail\nresidues 1-20"),
    );
    records
}

#[test]
fn listing_export_round_trips_through_a_csv_reader() {
    let records = awkward_records();
    let service = CatalogService::new(memory_store(&records));

    let csv = service
        .export_listing_csv(
            &CatalogParams::from_pairs([("sortBy", "createdAt"), ("limit", "100")])
                .list_request()
                .unwrap(),
        )
        .unwrap();
    assert!(csv.starts_with(CSV_HEADER));
    assert!(!csv.ends_with('\n'));

    let rows = parse_csv(&csv);
    assert_eq!(rows.len(), records.len() + 1);
    assert!(rows.iter().all(|row| row.len() == 8));

    let awkward = rows
        .iter()
        .find(|row| row[1] == "Anti-histone")
        .expect("awkward record exported");
    assert_eq!(awkward[0], "Lupus, drug-induced");
    assert_eq!(awkward[2], "Histone H2A-H2B \"dimer\"");
    assert_eq!(awkward[3], "N-terminal tail\nresidues 1-20");
    assert_eq!(awkward[4], "");
    assert_eq!(awkward[7], "No");

    let first = &rows[1];
    assert_eq!(
        first,
        &[
            "Systemic lupus erythematosus (SLE)",
            "Anti-dsDNA",
            "Double-stranded DNA",
            "Phosphate backbone",
            "Multiple",
            "2024-01-01",
            "2024-01-01",
            "Yes",
        ]
    );
}

#[test]
fn ranked_export_preserves_ranking_order() {
    let conn = sqlite_conn(&sample_records());
    let service = CatalogService::new(SqliteRecordStore::new(&conn));

    let request = CatalogParams::from_pairs([("q", "lupus")])
        .ranked_request()
        .unwrap();
    let csv = service.export_ranked_csv(&request).unwrap();
    let rows = parse_csv(&csv);

    assert_eq!(rows[0].join(","), CSV_HEADER);
    let antibodies = rows[1..]
        .iter()
        .map(|row| row[1].as_str())
        .collect::<Vec<_>>();
    assert_eq!(antibodies.len(), 4);
    assert_eq!(antibodies[3], "Anti-Lupus anticoagulant");
}

#[test]
fn empty_listing_exports_header_only() {
    let service = CatalogService::new(memory_store(&sample_records()));
    let csv = service
        .export_listing_csv(
            &CatalogParams::from_pairs([("disease", "no such disease")])
                .list_request()
                .unwrap(),
        )
        .unwrap();
    assert_eq!(csv, CSV_HEADER);
}

#[test]
fn listing_export_covers_every_page_of_the_filtered_set() {
    let records = (0..130)
        .map(|i| Record::new(format!("Disease {i:03}"), "Anti-X", "X"))
        .collect::<Vec<_>>();
    let conn = sqlite_conn(&records);
    let stores = [
        CatalogService::new(memory_store(&records))
            .export_listing_csv(&CatalogParams::default().list_request().unwrap())
            .unwrap(),
        CatalogService::new(SqliteRecordStore::new(&conn))
            .export_listing_csv(&CatalogParams::default().list_request().unwrap())
            .unwrap(),
    ];

    for csv in stores {
        let rows = parse_csv(&csv);
        assert_eq!(rows.len(), 131);
        assert_eq!(rows[1][0], "Disease 000");
        assert_eq!(rows[100][0], "Disease 099");
        assert_eq!(rows[130][0], "Disease 129");
    }

    let service = CatalogService::new(memory_store(&records));
    let filtered = service
        .export_listing_csv(
            &CatalogParams::from_pairs([
                ("disease", "disease 1"),
                ("sortOrder", "desc"),
                ("page", "3"),
                ("limit", "5"),
            ])
            .list_request()
            .unwrap(),
        )
        .unwrap();
    let rows = parse_csv(&filtered);
    assert_eq!(rows.len(), 31);
    assert_eq!(rows[1][0], "Disease 129");
    assert_eq!(rows[30][0], "Disease 100");
}
