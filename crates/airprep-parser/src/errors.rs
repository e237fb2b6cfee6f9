use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{parser} file is not valid UTF-8")]
    InvalidEncoding { parser: &'static str },

    #[error("{parser} header invalid: {message}")]
    InvalidHeader {
        parser: &'static str,
        message: String,
    },

    #[error("{parser} CSV error: {source}")]
    Csv {
        parser: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{parser} data row {line_index} invalid: {message}")]
    DataRow {
        parser: &'static str,
        line_index: usize,
        message: String,
    },

    #[error("{parser} failed to build table: {source}")]
    Table {
        parser: &'static str,
        #[source]
        source: PolarsError,
    },
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    #[error("column '{column}' has type {found}, expected a timestamp")]
    NotTimestamp { column: String, found: String },

    #[error("index has {found} rows but table has {expected}")]
    IndexLength { expected: usize, found: usize },

    #[error("invalid timestamp '{value}' at row {row}")]
    InvalidTimestamp { value: String, row: usize },

    #[error("table is already indexed by '{0}'")]
    AlreadyIndexed(String),

    #[error("cannot append to or from an indexed table")]
    IndexedAppend,

    #[error("column '{column}' cannot be converted from {found}")]
    UnsupportedConversion { column: String, found: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error("JSON operation failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ZIP operation failed: {0}")]
    Zip(#[from] ::zip::result::ZipError),
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Table operation failed: {0}")]
    Table(#[from] TableError),
    #[error("Manifest is missing or corrupt")]
    MissingManifest,
    #[error("Data file '{0}' is missing from archive")]
    MissingDataFile(String),
    #[error("Unsupported archive format version {0}")]
    UnsupportedVersion(u32),
    #[error("Archive contents disagree with manifest: {0}")]
    ManifestMismatch(String),
}
