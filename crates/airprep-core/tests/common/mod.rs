#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use airprep_core::object_store::MemoryBlobStore;
use airprep_parser::{parse_csv_table, Table};

pub const CONTAINER: &str = "air-data";
pub const CSV_PREFIX: &str = "DataPreprocessing/src/data_store_pkl_files/csv";

pub fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../airprep-parser/tests/data")
        .join(name);
    fs::read(&path).unwrap_or_else(|err| panic!("failed to read fixture {}: {}", path.display(), err))
}

pub fn fixture_table(name: &str) -> Table {
    parse_csv_table(&fixture(name)).expect("fixture parses")
}

pub fn csv_key(name: &str) -> String {
    format!("{CSV_PREFIX}/{name}")
}

/// A memory store seeded with the named fixtures under the CSV prefix.
pub fn seeded_store(names: &[&str]) -> MemoryBlobStore {
    let store = MemoryBlobStore::new();
    for name in names {
        store.insert(CONTAINER, &csv_key(name), fixture(name));
    }
    store
}
