use std::io::{Cursor, Read, Write};

use ::zip::{write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};
use chrono::Utc;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ArchiveError;
use crate::model::Table;

pub const ARCHIVE_FORMAT_VERSION: u32 = 1;

const MANIFEST_PATH: &str = "manifest.json";
const DATA_PATH: &str = "table.parquet";

/// A source file that contributed rows to an archived table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub key: String,
    pub blake3: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub name: String,
    pub dtype: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveManifest {
    pub format_version: u32,
    pub row_count: usize,
    pub index: Option<ColumnEntry>,
    pub columns: Vec<ColumnEntry>,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    pub created_at: String,
    /// Zip entry holding the parquet data.
    pub data_path: String,
}

#[derive(Debug, Clone)]
pub struct TableArchive {
    pub manifest: ArchiveManifest,
    pub table: Table,
}

impl Table {
    /// Serializes the table (index first) to a zip holding `manifest.json` and a parquet file.
    pub fn to_archive(&self, sources: &[SourceEntry]) -> Result<Vec<u8>, ArchiveError> {
        let manifest = self.to_manifest(sources);
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;

        let mut combined = self.to_combined_frame()?;
        let mut parquet_bytes = Vec::new();
        ParquetWriter::new(&mut parquet_bytes).finish(&mut combined)?;

        let cursor = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(cursor);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(MANIFEST_PATH, options)?;
        zip.write_all(&manifest_bytes)?;

        zip.start_file(&manifest.data_path, options)?;
        zip.write_all(&parquet_bytes)?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    fn to_manifest(&self, sources: &[SourceEntry]) -> ArchiveManifest {
        let index = self.index().map(|column| ColumnEntry {
            name: column.name().to_string(),
            dtype: column.dtype().to_string(),
        });
        let columns = self
            .dtypes()
            .into_iter()
            .map(|(name, dtype)| ColumnEntry {
                name,
                dtype: dtype.to_string(),
            })
            .collect();

        ArchiveManifest {
            format_version: ARCHIVE_FORMAT_VERSION,
            row_count: self.height(),
            index,
            columns,
            sources: sources.to_vec(),
            created_at: Utc::now().to_rfc3339(),
            data_path: DATA_PATH.to_string(),
        }
    }

    pub fn from_archive(bytes: &[u8]) -> Result<TableArchive, ArchiveError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let manifest = manifest_from(&mut archive)?;

        let mut frame = {
            let mut data_file = archive
                .by_name(&manifest.data_path)
                .map_err(|_| ArchiveError::MissingDataFile(manifest.data_path.clone()))?;
            let mut data_bytes = Vec::new();
            data_file.read_to_end(&mut data_bytes)?;
            ParquetReader::new(Cursor::new(data_bytes)).finish()?
        };

        if frame.height() != manifest.row_count {
            return Err(ArchiveError::ManifestMismatch(format!(
                "manifest lists {} rows, data holds {}",
                manifest.row_count,
                frame.height()
            )));
        }

        let table = match &manifest.index {
            Some(entry) => {
                let index = frame.drop_in_place(&entry.name).map_err(|_| {
                    ArchiveError::ManifestMismatch(format!("index column '{}' missing", entry.name))
                })?;
                Table::with_index(frame, index)?
            }
            None => Table::new(frame),
        };

        let expected: Vec<&str> = manifest.columns.iter().map(|c| c.name.as_str()).collect();
        if table.column_names() != expected {
            return Err(ArchiveError::ManifestMismatch(format!(
                "manifest lists columns {:?}, data holds {:?}",
                expected,
                table.column_names()
            )));
        }

        Ok(TableArchive { manifest, table })
    }
}

/// Reads only the manifest of an archive.
pub fn read_manifest(bytes: &[u8]) -> Result<ArchiveManifest, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    manifest_from(&mut archive)
}

fn manifest_from<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<ArchiveManifest, ArchiveError> {
    let manifest: ArchiveManifest = {
        let mut manifest_file = archive
            .by_name(MANIFEST_PATH)
            .map_err(|_| ArchiveError::MissingManifest)?;
        let mut manifest_bytes = Vec::new();
        manifest_file.read_to_end(&mut manifest_bytes)?;
        serde_json::from_slice(&manifest_bytes)?
    };

    if manifest.format_version != ARCHIVE_FORMAT_VERSION {
        return Err(ArchiveError::UnsupportedVersion(manifest.format_version));
    }
    Ok(manifest)
}
