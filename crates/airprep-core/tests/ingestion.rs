mod common;

use airprep_core::anomaly::Severity;
use airprep_core::ingestion::load_source_tables;
use airprep_core::object_store::MemoryBlobStore;
use airprep_parser::CsvTableParser;

use common::{csv_key, fixture, seeded_store, CONTAINER, CSV_PREFIX};

#[test]
fn loads_csv_files_in_key_order() {
    let store = seeded_store(&["delhi_2024_02.csv", "delhi_2024_01.csv"]);
    store.insert(CONTAINER, &format!("{CSV_PREFIX}/notes.txt"), "not a table");

    let outcome = load_source_tables(&store, CONTAINER, CSV_PREFIX, &CsvTableParser);

    assert!(outcome.is_clean(), "{:?}", outcome.anomalies.messages());
    let keys: Vec<&str> = outcome.value.iter().map(|s| s.key.as_str()).collect();
    assert_eq!(keys, [csv_key("delhi_2024_01.csv"), csv_key("delhi_2024_02.csv")]);
    assert_eq!(outcome.value[0].table.height(), 5);
    assert_eq!(outcome.value[1].table.height(), 3);
}

#[test]
fn source_hash_is_blake3_of_file_bytes() {
    let store = seeded_store(&["delhi_2024_01.csv"]);

    let outcome = load_source_tables(&store, CONTAINER, CSV_PREFIX, &CsvTableParser);

    let expected = blake3::hash(&fixture("delhi_2024_01.csv")).to_hex().to_string();
    let entry = outcome.value[0].source_entry();
    assert_eq!(entry.blake3, expected);
    assert_eq!(entry.key, csv_key("delhi_2024_01.csv"));
}

#[test]
fn zero_byte_file_is_skipped_with_one_warning() {
    let store = seeded_store(&["delhi_2024_01.csv", "delhi_2024_03.csv"]);
    store.insert(CONTAINER, &csv_key("empty.csv"), Vec::<u8>::new());

    let outcome = load_source_tables(&store, CONTAINER, CSV_PREFIX, &CsvTableParser);

    assert_eq!(outcome.value.len(), 2);
    assert_eq!(
        outcome.anomalies.messages(),
        [format!("File '{}' is empty and was skipped.", csv_key("empty.csv"))]
    );
    let anomaly = outcome.anomalies.iter().next().expect("one anomaly");
    assert_eq!(anomaly.severity, Severity::Warning);
}

#[test]
fn no_csv_files_reports_prefix() {
    let store = seeded_store(&[]);
    store.insert(CONTAINER, "elsewhere/data.csv", "a\n1\n");

    let outcome = load_source_tables(&store, CONTAINER, CSV_PREFIX, &CsvTableParser);

    assert!(outcome.value.is_empty());
    assert_eq!(
        outcome.anomalies.messages(),
        [format!("No CSV files found in '{CSV_PREFIX}'.")]
    );
    assert!(!outcome.anomalies.has_errors());
}

#[test]
fn only_empty_files_means_nothing_loaded() {
    let store = seeded_store(&[]);
    store.insert(CONTAINER, &csv_key("a.csv"), Vec::<u8>::new());

    let outcome = load_source_tables(&store, CONTAINER, CSV_PREFIX, &CsvTableParser);

    assert!(outcome.value.is_empty());
    assert_eq!(outcome.anomalies.len(), 2);
    assert!(outcome.anomalies.has_errors());
    assert_eq!(
        outcome.anomalies.messages()[1],
        "No valid data files were loaded."
    );
}

#[test]
fn parse_failure_discards_loaded_tables() {
    let store = seeded_store(&["delhi_2024_01.csv", "ragged.csv"]);

    let outcome = load_source_tables(&store, CONTAINER, CSV_PREFIX, &CsvTableParser);

    assert!(outcome.value.is_empty());
    assert_eq!(outcome.anomalies.len(), 1);
    let message = &outcome.anomalies.messages()[0];
    assert!(message.contains("ragged.csv"), "{message}");
}

#[test]
fn empty_store_yields_a_single_anomaly() {
    let store = MemoryBlobStore::new();

    let outcome = load_source_tables(&store, CONTAINER, "csv", &CsvTableParser);

    assert!(outcome.value.is_empty());
    assert_eq!(outcome.anomalies.len(), 1);
    assert_eq!(
        outcome.anomalies.messages(),
        ["No CSV files found in 'csv'."]
    );
}
