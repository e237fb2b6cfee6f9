use airprep_parser::{SourceEntry, Table, TableArchive};
use tracing::info;

use crate::anomaly::{Anomalies, Outcome};
use crate::error::Result;
use crate::object_store::{BlobStore, OCTET_STREAM};

/// Serializes `table` into a table archive and writes it to `container/key`.
///
/// A missing table or a serialization failure is reported as an anomaly and nothing is
/// written. Store write failures are returned as errors.
pub fn save_table(
    store: &dyn BlobStore,
    container: &str,
    key: &str,
    table: Option<&Table>,
    sources: &[SourceEntry],
) -> Result<Anomalies> {
    let mut anomalies = Anomalies::new();
    let Some(table) = table else {
        anomalies.error("No table to save.");
        return Ok(anomalies);
    };

    let bytes = match table.to_archive(sources) {
        Ok(bytes) => bytes,
        Err(err) => {
            anomalies.error(format!("Failed to serialize table for '{key}': {err}"));
            return Ok(anomalies);
        }
    };

    store.write_bytes(container, key, &bytes, OCTET_STREAM)?;
    info!(
        container,
        key,
        rows = table.height(),
        bytes = bytes.len(),
        "Saved table archive"
    );
    Ok(anomalies)
}

/// Reads a table archive previously written by [`save_table`].
pub fn open_table(
    store: &dyn BlobStore,
    container: &str,
    key: &str,
) -> Result<Outcome<Option<TableArchive>>> {
    let mut anomalies = Anomalies::new();
    if !store.exists(container, key)? {
        anomalies.error(format!(
            "File '{key}' does not exist in container '{container}'."
        ));
        return Ok(Outcome::new(None, anomalies));
    }

    let bytes = store.read_bytes(container, key)?;
    match Table::from_archive(&bytes) {
        Ok(archive) => {
            info!(
                container,
                key,
                rows = archive.table.height(),
                "Loaded table archive"
            );
            Ok(Outcome::new(Some(archive), anomalies))
        }
        Err(err) => {
            anomalies.error(format!("Failed to read table archive '{key}': {err}"));
            Ok(Outcome::new(None, anomalies))
        }
    }
}
