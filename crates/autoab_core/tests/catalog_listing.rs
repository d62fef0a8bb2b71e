mod common;

use autoab_core::{
    CatalogError, CatalogParams, CatalogService, RecordStorage, SqliteRecordStore,
    ValidationError,
};
use common::{memory_store, sample_records, sqlite_conn};

fn autoantibodies<S: RecordStorage>(
    service: &CatalogService<S>,
    pairs: &[(&str, &str)],
) -> Vec<String> {
    service
        .list_with_params(&CatalogParams::from_pairs(pairs.iter().copied()))
        .unwrap()
        .records
        .into_iter()
        .map(|record| record.autoantibody)
        .collect()
}

fn check_listing<S: RecordStorage>(service: &CatalogService<S>) {
    let page = service
        .list_with_params(&CatalogParams::from_pairs([
            ("sortBy", "createdAt"),
            ("page", "2"),
            ("limit", "3"),
        ]))
        .unwrap();
    let antibodies = page
        .records
        .iter()
        .map(|record| record.autoantibody.as_str())
        .collect::<Vec<_>>();
    assert_eq!(antibodies, ["Anti-SSA/Ro60", "Anti-SSB/La", "Anti-CCP"]);
    assert_eq!(page.pagination.total, 8);
    assert_eq!(page.pagination.total_pages, 3);
    assert!(page.pagination.has_next_page);
    assert!(page.pagination.has_prev_page);
    assert!(page.stats.is_none());

    assert_eq!(
        autoantibodies(service, &[("sortBy", "autoantibody"), ("limit", "100")]),
        [
            "Anti-AChR",
            "Anti-C1q",
            "Anti-CCP",
            "Anti-Lupus anticoagulant",
            "Anti-SSA/Ro60",
            "Anti-SSB/La",
            "Anti-Sm",
            "Anti-dsDNA",
        ]
    );

    assert_eq!(
        autoantibodies(
            service,
            &[("sortBy", "updatedAt"), ("sortOrder", "desc"), ("limit", "2")]
        ),
        ["Anti-Lupus anticoagulant", "Anti-AChR"]
    );
}

#[test]
fn listing_behaves_identically_on_both_stores() {
    let records = sample_records();
    check_listing(&CatalogService::new(memory_store(&records)));

    let conn = sqlite_conn(&records);
    check_listing(&CatalogService::new(SqliteRecordStore::new(&conn)));
}

#[test]
fn unknown_sort_key_falls_back_to_disease() {
    let service = CatalogService::new(memory_store(&sample_records()));
    let page = service
        .list_with_params(&CatalogParams::from_pairs([
            ("sortBy", "dropTable"),
            ("sortOrder", "DESC"),
            ("limit", "100"),
        ]))
        .unwrap();

    let diseases = page
        .records
        .iter()
        .map(|record| record.disease.as_str())
        .collect::<Vec<_>>();
    let mut expected = diseases.clone();
    expected.sort();
    assert_eq!(diseases, expected);
}

#[test]
fn out_of_range_pagination_is_normalized() {
    let service = CatalogService::new(memory_store(&sample_records()));

    let page = service
        .list_with_params(&CatalogParams::from_pairs([("page", "-2"), ("limit", "abc")]))
        .unwrap();
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.limit, 10);
    assert_eq!(page.records.len(), 8);
    assert_eq!(page.pagination.total_pages, 1);
    assert!(!page.pagination.has_next_page);
    assert!(!page.pagination.has_prev_page);

    let capped = service
        .list_with_params(&CatalogParams::from_pairs([("limit", "5000")]))
        .unwrap();
    assert_eq!(capped.pagination.limit, 100);

    let beyond = service
        .list_with_params(&CatalogParams::from_pairs([("page", "9"), ("limit", "5")]))
        .unwrap();
    assert!(beyond.records.is_empty());
    assert_eq!(beyond.pagination.total_pages, 2);
    assert!(!beyond.pagination.has_next_page);
}

#[test]
fn filtered_listing_reports_stats() {
    let conn = sqlite_conn(&sample_records());
    let service = CatalogService::new(SqliteRecordStore::new(&conn));

    let page = service
        .list_with_params(&CatalogParams::from_pairs([
            ("disease", "sle"),
            ("includeStats", "true"),
        ]))
        .unwrap();
    let stats = page.stats.expect("stats requested");
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.unique_diseases, 1);
    assert_eq!(stats.unique_autoantibodies, 3);
    assert_eq!(stats.unique_autoantigens, 3);
}

#[test]
fn scoped_search_only_looks_at_the_chosen_field() {
    let service = CatalogService::new(memory_store(&sample_records()));

    let everywhere = service
        .list_with_params(&CatalogParams::from_pairs([("search", "ro60")]))
        .unwrap();
    let epitope_only = service
        .list_with_params(&CatalogParams::from_pairs([
            ("search", "ro60"),
            ("field", "epitope"),
        ]))
        .unwrap();
    let disease_only = service
        .list_with_params(&CatalogParams::from_pairs([
            ("search", "ro60"),
            ("field", "disease"),
        ]))
        .unwrap();

    assert_eq!(everywhere.pagination.total, 1);
    assert_eq!(epitope_only.pagination.total, 1);
    assert_eq!(disease_only.pagination.total, 0);
}

#[test]
fn invalid_field_scope_is_a_validation_error() {
    let service = CatalogService::new(memory_store(&sample_records()));
    let err = service
        .list_with_params(&CatalogParams::from_pairs([("search", "x"), ("field", "type")]))
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Validation(ValidationError::InvalidField(ref value)) if value == "type"
    ));
}

#[test]
fn overview_counts_the_whole_catalog() {
    let conn = sqlite_conn(&sample_records());
    let service = CatalogService::new(SqliteRecordStore::new(&conn));

    let overview = service.overview().unwrap();
    assert_eq!(overview.total_records, 8);
    assert_eq!(overview.unique_diseases, 5);
    assert_eq!(overview.unique_autoantibodies, 8);
    assert_eq!(overview.unique_autoantigens, 8);
    assert_eq!(overview.unique_epitopes, 4);
    assert_eq!(overview.verified_records, 4);
}

#[test]
fn listing_serializes_with_camel_case_pagination() {
    let service = CatalogService::new(memory_store(&sample_records()));
    let page = service
        .list_with_params(&CatalogParams::from_pairs([("limit", "1")]))
        .unwrap();

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["pagination"]["totalPages"], 8);
    assert_eq!(json["pagination"]["hasNextPage"], true);
    assert_eq!(json["pagination"]["hasPrevPage"], false);
    assert!(json.get("stats").is_none());
}
