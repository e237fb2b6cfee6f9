pub mod archive;
pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use archive::{
    read_manifest, ArchiveManifest, ColumnEntry, SourceEntry, TableArchive, ARCHIVE_FORMAT_VERSION,
};
pub use errors::{ArchiveError, ParserError, TableError};
pub use formats::{parse_timestamp_micros, CsvTableParser};
pub use model::{timestamp_dtype, ColumnDrop, Table};
pub use registry::{parse_csv_table, TableParser};
