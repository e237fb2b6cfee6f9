use airprep_parser::Table;
use tracing::info;

use crate::anomaly::Anomalies;
use crate::readings::{ReadingColumns, DATE_COLUMN, PARAMETER_COLUMN, VALUE_COLUMN};

pub const REQUIRED_COLUMNS: [&str; 3] = [DATE_COLUMN, PARAMETER_COLUMN, VALUE_COLUMN];

/// Parameters whose readings are concentrations and can never be negative.
pub const POLLUTANT_CODES: [&str; 6] = ["pm25", "pm10", "o3", "no2", "so2", "co"];

/// Compares each table's ordered column names against the first table's.
pub fn check_column_consistency<T: AsRef<Table>>(tables: &[T]) -> Anomalies {
    let mut anomalies = Anomalies::new();
    let Some((first, rest)) = tables.split_first() else {
        return anomalies;
    };

    let reference = first.as_ref().column_names();
    for (offset, table) in rest.iter().enumerate() {
        if table.as_ref().column_names() != reference {
            anomalies.error(format!("Column mismatch detected in table {}.", offset + 1));
        }
    }

    if anomalies.is_empty() {
        info!(tables = tables.len(), "All columns are consistent.");
    }
    anomalies
}

/// Flags missing required columns and negative pollutant readings in every table.
pub fn detect_data_anomalies<T: AsRef<Table>>(tables: &[T]) -> Anomalies {
    let mut anomalies = Anomalies::new();

    for (position, table) in tables.iter().enumerate() {
        let table = table.as_ref();
        for column in REQUIRED_COLUMNS {
            if !table.has_column(column) {
                anomalies.error(format!(
                    "Missing critical column '{column}' in table {position}."
                ));
            }
        }

        if !table.has_column(PARAMETER_COLUMN) || !table.has_column(VALUE_COLUMN) {
            continue;
        }

        let readings = match ReadingColumns::from_table(table) {
            Ok(readings) => readings,
            Err(err) => {
                anomalies.error(format!(
                    "Could not read measurement columns in table {position}: {err}"
                ));
                continue;
            }
        };

        for reading in readings.iter() {
            let (Some(parameter), Some(value)) = (reading.parameter, reading.value) else {
                continue;
            };
            if value < 0.0 && POLLUTANT_CODES.contains(&parameter) {
                let date = reading.date.unwrap_or("unknown date");
                anomalies.warning(format!(
                    "Invalid negative value detected for {parameter}: {value} on {date} in table {position}."
                ));
            }
        }
    }

    if anomalies.is_empty() {
        info!(tables = tables.len(), "No data anomalies detected.");
    }
    anomalies
}
