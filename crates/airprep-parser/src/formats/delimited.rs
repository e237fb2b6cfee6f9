use std::collections::HashSet;

use csv::StringRecord;
use polars::prelude::*;

use crate::errors::ParserError;
use crate::model::Table;
use crate::registry::TableParser;

use super::common::{build_column, clean_cell};

/// Comma-separated files with a single header row.
pub struct CsvTableParser;

impl Default for CsvTableParser {
    fn default() -> Self {
        Self
    }
}

impl CsvTableParser {
    const NAME: &'static str = "CSV";

    fn column_names(header: &StringRecord) -> Result<Vec<String>, ParserError> {
        let names: Vec<String> = header.iter().map(|name| name.trim().to_string()).collect();
        if names.is_empty() || names.iter().all(|name| name.is_empty()) {
            return Err(ParserError::InvalidHeader {
                parser: Self::NAME,
                message: "header row has no column names".to_string(),
            });
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.is_empty() {
                return Err(ParserError::InvalidHeader {
                    parser: Self::NAME,
                    message: "header row contains an empty column name".to_string(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(ParserError::InvalidHeader {
                    parser: Self::NAME,
                    message: format!("duplicate column name '{name}'"),
                });
            }
        }
        Ok(names)
    }
}

impl TableParser for CsvTableParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extension(&self) -> &'static str {
        ".csv"
    }

    fn parse(&self, content: &[u8]) -> Result<Table, ParserError> {
        let content = std::str::from_utf8(content).map_err(|_| ParserError::InvalidEncoding {
            parser: Self::NAME,
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());
        let mut records = reader.records();

        let header = records
            .next()
            .ok_or(ParserError::InvalidHeader {
                parser: Self::NAME,
                message: "file has no header row".to_string(),
            })?
            .map_err(|err| ParserError::Csv {
                parser: Self::NAME,
                source: err,
            })?;
        let names = Self::column_names(&header)?;

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
        for (offset, record) in records.enumerate() {
            let record = record.map_err(|err| ParserError::Csv {
                parser: Self::NAME,
                source: err,
            })?;
            if record.len() != names.len() {
                return Err(ParserError::DataRow {
                    parser: Self::NAME,
                    line_index: offset + 2,
                    message: format!(
                        "expected {} fields, found {}",
                        names.len(),
                        record.len()
                    ),
                });
            }
            for (column, value) in cells.iter_mut().zip(record.iter()) {
                column.push(clean_cell(value));
            }
        }

        let columns: Vec<Column> = names
            .iter()
            .zip(cells)
            .map(|(name, values)| build_column(name, values))
            .collect();

        DataFrame::new(columns)
            .map(Table::new)
            .map_err(|source| ParserError::Table {
                parser: Self::NAME,
                source,
            })
    }
}
