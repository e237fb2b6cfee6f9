use airprep_parser::{ParserError, SourceEntry, Table, TableParser};
use blake3::Hasher;
use thiserror::Error;
use tracing::info;

use crate::anomaly::{Anomalies, Outcome};
use crate::object_store::{BlobStore, StoreError};

/// A table loaded from the blob store, with its key and content hash.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub key: String,
    pub hash: String,
    pub table: Table,
}

impl SourceTable {
    pub fn source_entry(&self) -> SourceEntry {
        SourceEntry {
            key: self.key.clone(),
            blake3: self.hash.clone(),
        }
    }
}

impl AsRef<Table> for SourceTable {
    fn as_ref(&self) -> &Table {
        &self.table
    }
}

#[derive(Debug, Error)]
enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to parse '{key}': {source}")]
    Parse {
        key: String,
        #[source]
        source: ParserError,
    },
}

/// Loads every file under `prefix` that `parser` accepts.
///
/// Zero-byte files are skipped with a warning. Any listing, read or parse failure discards
/// everything loaded so far and becomes the only anomaly.
pub fn load_source_tables(
    store: &dyn BlobStore,
    container: &str,
    prefix: &str,
    parser: &dyn TableParser,
) -> Outcome<Vec<SourceTable>> {
    let mut anomalies = Anomalies::new();

    let tables = match try_load(store, container, prefix, parser, &mut anomalies) {
        Ok(Some(tables)) => tables,
        // No candidate files is terminal for the step and carries a single anomaly.
        Ok(None) => return Outcome::new(Vec::new(), anomalies),
        Err(err) => {
            let mut failure = Anomalies::new();
            failure.error(err.to_string());
            return Outcome::new(Vec::new(), failure);
        }
    };

    if tables.is_empty() {
        anomalies.error("No valid data files were loaded.");
    }
    Outcome::new(tables, anomalies)
}

fn try_load(
    store: &dyn BlobStore,
    container: &str,
    prefix: &str,
    parser: &dyn TableParser,
    anomalies: &mut Anomalies,
) -> Result<Option<Vec<SourceTable>>, LoadError> {
    let candidates: Vec<String> = store
        .list(container, prefix)?
        .into_iter()
        .filter(|key| parser.accepts(key))
        .collect();

    if candidates.is_empty() {
        anomalies.warning(format!("No {} files found in '{prefix}'.", parser.name()));
        return Ok(None);
    }

    let mut tables = Vec::with_capacity(candidates.len());
    for key in candidates {
        if store.size(container, &key)? == 0 {
            anomalies.warning(format!("File '{key}' is empty and was skipped."));
            continue;
        }

        let contents = store.read_bytes(container, &key)?;
        let hash = compute_hash(&contents);
        let table = parser.parse(&contents).map_err(|source| LoadError::Parse {
            key: key.clone(),
            source,
        })?;

        info!(key = %key, rows = table.height(), columns = table.width(), "Loaded source file");
        tables.push(SourceTable { key, hash, table });
    }

    Ok(Some(tables))
}

fn compute_hash(contents: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(contents);
    let hash = hasher.finalize();
    hash.to_hex().to_string()
}
