mod common;
mod delimited;

pub use common::parse_timestamp_micros;
pub use delimited::CsvTableParser;
