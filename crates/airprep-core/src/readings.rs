use airprep_parser::{Table, TableError};
use polars::prelude::*;

pub const DATE_COLUMN: &str = "date";
pub const PARAMETER_COLUMN: &str = "parameter";
pub const VALUE_COLUMN: &str = "value";

/// One row of a long-format measurement table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading<'a> {
    pub row: usize,
    pub date: Option<&'a str>,
    pub parameter: Option<&'a str>,
    pub value: Option<f64>,
}

/// Typed views over the `date`, `parameter` and `value` columns of a table.
///
/// `value` is cast non-strictly, so cells that are not numeric read as `None`. A missing
/// `date` column yields `None` dates.
pub struct ReadingColumns {
    date: Option<Column>,
    parameter: Column,
    value: Column,
}

impl ReadingColumns {
    pub fn from_table(table: &Table) -> Result<Self, TableError> {
        let parameter = table.column(PARAMETER_COLUMN)?.cast(&DataType::String)?;
        let value = table.column(VALUE_COLUMN)?.cast(&DataType::Float64)?;
        let date = if table.has_column(DATE_COLUMN) {
            Some(table.column(DATE_COLUMN)?.cast(&DataType::String)?)
        } else {
            None
        };
        Ok(Self {
            date,
            parameter,
            value,
        })
    }

    pub fn len(&self) -> usize {
        self.parameter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, row: usize) -> Option<Reading<'_>> {
        if row >= self.len() {
            return None;
        }
        let parameter = self.parameter.str().ok().and_then(|ca| ca.get(row));
        let value = self.value.f64().ok().and_then(|ca| ca.get(row));
        let date = self
            .date
            .as_ref()
            .and_then(|column| column.str().ok())
            .and_then(|ca| ca.get(row));
        Some(Reading {
            row,
            date,
            parameter,
            value,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Reading<'_>> + '_ {
        (0..self.len()).filter_map(move |row| self.get(row))
    }
}
