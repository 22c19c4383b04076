//! Behavior tests for the JSON record store.

use windward_store::{JsonFileStore, RecordStore};
use windward_tests::record;

fn store_in(dir: &tempfile::TempDir) -> JsonFileStore {
    JsonFileStore::new(dir.path().join("records.json"))
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn when_the_store_file_does_not_exist_loading_yields_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);

    assert!(store.load_all().expect("load").is_empty());
}

#[test]
fn stored_records_come_back_newest_first() {
    // Given: records written out of date order
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    store
        .upsert_batch(&[
            record("2024-01-02", "強風"),
            record("2024-01-10", "無風"),
            record("2024-01-05", "亂流"),
        ])
        .expect("upsert");

    // When: reloading
    let loaded = store.load_all().expect("load");

    // Then: newest first
    let dates: Vec<String> = loaded.iter().map(|r| r.date.to_string()).collect();
    assert_eq!(dates, vec!["2024-01-10", "2024-01-05", "2024-01-02"]);
}

// =============================================================================
// Upsert semantics
// =============================================================================

#[test]
fn when_a_date_already_exists_the_new_record_replaces_it() {
    // Given: a stored day
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    store
        .upsert_batch(&[record("2024-01-02", "強風")])
        .expect("first write");

    // When: the same day arrives again with a different label
    let outcome = store
        .upsert_batch(&[record("2024-01-02", "無風")])
        .expect("second write");

    // Then: one record remains, carrying the newer content
    assert_eq!(outcome.replaced, 1);
    assert_eq!(outcome.inserted, 0);
    let loaded = store.load_all().expect("load");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].regime_label, "無風");
}

#[test]
fn upserts_survive_reopening_the_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.json");

    JsonFileStore::new(&path)
        .upsert_batch(&[record("2024-01-02", "強風")])
        .expect("write");

    // A fresh handle sees the same state.
    let reopened = JsonFileStore::new(&path);
    assert_eq!(reopened.load_all().expect("load").len(), 1);
}

// =============================================================================
// Degraded input
// =============================================================================

#[test]
fn rows_the_schema_cannot_parse_are_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("records.json");
    std::fs::write(
        &path,
        r#"[{"date":"2024-01-02","regime_label":"強風"},{"unexpected":true}]"#,
    )
    .expect("seed");

    let loaded = JsonFileStore::new(&path).load_all().expect("load");
    assert_eq!(loaded.len(), 1);
}

#[test]
fn clearing_the_store_removes_every_record() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    store
        .upsert_batch(&[record("2024-01-02", "強風")])
        .expect("write");

    store.clear().expect("clear");

    assert!(store.load_all().expect("load").is_empty());
}
