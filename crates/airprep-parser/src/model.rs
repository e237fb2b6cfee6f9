use polars::prelude::*;

use crate::errors::TableError;
use crate::formats::parse_timestamp_micros;

/// Cell type used for every timestamp column and for the index: UTC instants in microseconds.
pub fn timestamp_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Microseconds, None)
}

/// Outcome of reconciling a list of requested column names against a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDrop {
    /// Requested columns that exist and will be removed, in request order.
    pub applied: Vec<String>,
    /// Requested columns the table does not have.
    pub ignored: Vec<String>,
}

impl ColumnDrop {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Named-column table with an optional timestamp index.
///
/// The index is held apart from the regular columns: once promoted, its name no longer
/// appears in [`Table::column_names`].
#[derive(Debug, Clone, Default)]
pub struct Table {
    frame: DataFrame,
    index: Option<Column>,
}

impl Table {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame, index: None }
    }

    pub fn with_index(frame: DataFrame, index: Column) -> Result<Self, TableError> {
        ensure_timestamp(&index)?;
        if frame.width() > 0 && frame.height() != index.len() {
            return Err(TableError::IndexLength {
                expected: frame.height(),
                found: index.len(),
            });
        }
        Ok(Self {
            frame,
            index: Some(index),
        })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn index(&self) -> Option<&Column> {
        self.index.as_ref()
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index.as_ref().map(|column| column.name().as_str())
    }

    pub fn height(&self) -> usize {
        match &self.index {
            Some(index) => index.len(),
            // A frame stripped of every column keeps its old height.
            None if self.frame.width() == 0 => 0,
            None => self.frame.height(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.get_column_index(name).is_some()
    }

    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        self.frame
            .column(name)
            .map_err(|_| TableError::ColumnNotFound(name.to_string()))
    }

    pub fn dtypes(&self) -> Vec<(String, DataType)> {
        self.frame
            .get_columns()
            .iter()
            .map(|column| (column.name().to_string(), column.dtype().clone()))
            .collect()
    }

    /// Splits `requested` into the columns present in this table and those that are not.
    pub fn reconcile_drop<S: AsRef<str>>(&self, requested: &[S]) -> ColumnDrop {
        let mut plan = ColumnDrop::default();
        for name in requested {
            let name = name.as_ref();
            if self.has_column(name) {
                if !plan.applied.iter().any(|existing| existing == name) {
                    plan.applied.push(name.to_string());
                }
            } else {
                plan.ignored.push(name.to_string());
            }
        }
        plan
    }

    pub fn drop_columns(&mut self, plan: &ColumnDrop) -> Result<(), TableError> {
        for name in &plan.applied {
            self.frame.drop_in_place(name)?;
        }
        Ok(())
    }

    pub fn cast_column(&mut self, name: &str, dtype: &DataType) -> Result<(), TableError> {
        let casted = self.column(name)?.cast(dtype)?;
        self.frame.with_column(casted)?;
        Ok(())
    }

    /// Makes sure `name` holds timestamps, parsing string cells when necessary.
    ///
    /// Returns `true` when the column was converted.
    pub fn parse_timestamps(&mut self, name: &str) -> Result<bool, TableError> {
        let dtype = self.column(name)?.dtype().clone();
        match dtype {
            DataType::Datetime(_, _) => Ok(false),
            DataType::Date => {
                self.cast_column(name, &timestamp_dtype())?;
                Ok(true)
            }
            DataType::String => {
                let values = self.column(name)?.str()?;
                let mut micros: Vec<Option<i64>> = Vec::with_capacity(values.len());
                for (row, value) in values.into_iter().enumerate() {
                    match value {
                        None => micros.push(None),
                        Some(raw) => {
                            let parsed = parse_timestamp_micros(raw).ok_or_else(|| {
                                TableError::InvalidTimestamp {
                                    value: raw.to_string(),
                                    row,
                                }
                            })?;
                            micros.push(Some(parsed));
                        }
                    }
                }
                let series = Series::new(name.into(), micros).cast(&timestamp_dtype())?;
                self.frame.with_column(series)?;
                Ok(true)
            }
            other => Err(TableError::UnsupportedConversion {
                column: name.to_string(),
                found: other.to_string(),
            }),
        }
    }

    /// Moves the timestamp column `name` out of the regular columns and makes it the index.
    pub fn promote_index(&mut self, name: &str) -> Result<(), TableError> {
        if let Some(existing) = self.index_name() {
            return Err(TableError::AlreadyIndexed(existing.to_string()));
        }
        let column = self.column(name)?.clone();
        ensure_timestamp(&column)?;
        self.frame.drop_in_place(name)?;
        self.index = Some(column);
        Ok(())
    }

    /// Appends the rows of `other` below this table's rows. Both tables must be unindexed
    /// and share column names and types.
    pub fn append(&mut self, other: &Table) -> Result<(), TableError> {
        if self.index.is_some() || other.index.is_some() {
            return Err(TableError::IndexedAppend);
        }
        self.frame.vstack_mut(&other.frame)?;
        Ok(())
    }

    /// The index (when present) followed by the regular columns, as a single frame.
    pub fn to_combined_frame(&self) -> Result<DataFrame, TableError> {
        let Some(index) = &self.index else {
            return Ok(self.frame.clone());
        };
        let mut columns: Vec<Column> = Vec::with_capacity(self.frame.width() + 1);
        columns.push(index.clone());
        columns.extend(self.frame.get_columns().iter().cloned());
        Ok(DataFrame::new(columns)?)
    }

    pub fn into_parts(self) -> (DataFrame, Option<Column>) {
        (self.frame, self.index)
    }
}

impl AsRef<Table> for Table {
    fn as_ref(&self) -> &Table {
        self
    }
}

impl From<DataFrame> for Table {
    fn from(frame: DataFrame) -> Self {
        Table::new(frame)
    }
}

fn ensure_timestamp(column: &Column) -> Result<(), TableError> {
    match column.dtype() {
        DataType::Datetime(_, _) => Ok(()),
        other => Err(TableError::NotTimestamp {
            column: column.name().to_string(),
            found: other.to_string(),
        }),
    }
}
