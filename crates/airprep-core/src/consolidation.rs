use airprep_parser::{Table, TableError};
use polars::prelude::DataType;
use tracing::{debug, info};

use crate::anomaly::{Anomalies, Outcome};

/// Concatenates `tables` in order into one table with the first table's columns.
///
/// Cell types that disagree across inputs are widened first. Columns holding only nulls
/// do not influence the widened type.
pub fn stack_tables(tables: Vec<Table>) -> Outcome<Option<Table>> {
    let mut anomalies = Anomalies::new();
    if tables.is_empty() {
        anomalies.error("No tables to stack.");
        return Outcome::new(None, anomalies);
    }

    match try_stack(tables) {
        Ok(stacked) => {
            info!(
                rows = stacked.height(),
                columns = stacked.width(),
                "Stacked source tables"
            );
            Outcome::new(Some(stacked), anomalies)
        }
        Err(err) => {
            anomalies.error(format!("Failed to stack tables: {err}"));
            Outcome::new(None, anomalies)
        }
    }
}

fn try_stack(mut tables: Vec<Table>) -> Result<Table, TableError> {
    let names = tables[0].column_names();

    for table in tables.iter_mut() {
        if table.index().is_none() && table.column_names() != names {
            let reordered = table.frame().select(names.iter().map(String::as_str))?;
            *table = Table::new(reordered);
        }
    }

    harmonize_types(&mut tables, &names)?;

    let mut parts = tables.into_iter();
    let mut stacked = match parts.next() {
        Some(first) => first,
        None => return Ok(Table::default()),
    };
    for part in parts {
        stacked.append(&part)?;
    }
    Ok(stacked)
}

fn harmonize_types(tables: &mut [Table], names: &[String]) -> Result<(), TableError> {
    for name in names {
        let mut informative: Vec<DataType> = Vec::new();
        for table in tables.iter() {
            let column = table.column(name)?;
            if column.null_count() < column.len() {
                informative.push(column.dtype().clone());
            }
        }

        let target = match common_dtype(&informative) {
            Some(dtype) => dtype,
            None => tables[0].column(name)?.dtype().clone(),
        };

        for table in tables.iter_mut() {
            if table.column(name)?.dtype() != &target {
                debug!(column = %name, dtype = %target, "Widening column before stacking");
                table.cast_column(name, &target)?;
            }
        }
    }
    Ok(())
}

fn common_dtype(dtypes: &[DataType]) -> Option<DataType> {
    let (first, rest) = dtypes.split_first()?;
    let mut common = first.clone();
    for dtype in rest {
        if dtype == &common {
            continue;
        }
        common = if is_numeric(dtype) && is_numeric(&common) {
            DataType::Float64
        } else {
            DataType::String
        };
    }
    Some(common)
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_and_float_widen_to_float() {
        let widened = common_dtype(&[DataType::Int64, DataType::Float64, DataType::Int64]);
        assert_eq!(widened, Some(DataType::Float64));
    }

    #[test]
    fn mixed_text_widens_to_string() {
        let widened = common_dtype(&[DataType::Int64, DataType::String]);
        assert_eq!(widened, Some(DataType::String));
        assert_eq!(common_dtype(&[]), None);
    }
}
