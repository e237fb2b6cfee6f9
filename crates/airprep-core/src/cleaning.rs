use airprep_parser::{ColumnDrop, Table};
use tracing::info;

use crate::anomaly::{Anomalies, Outcome};

pub use crate::readings::DATE_COLUMN;

/// Removes the requested columns that exist in `table`. Names the table lacks are ignored
/// unless none of them exist, which leaves the table untouched and records a warning.
pub fn drop_columns<S: AsRef<str>>(table: &mut Table, columns: &[S]) -> Outcome<ColumnDrop> {
    let mut anomalies = Anomalies::new();
    let plan = table.reconcile_drop(columns);

    if plan.is_noop() {
        let requested: Vec<&str> = columns.iter().map(AsRef::as_ref).collect();
        anomalies.warning(format!(
            "None of the columns [{}] exist in the table.",
            requested.join(", ")
        ));
        return Outcome::new(plan, anomalies);
    }

    if let Err(err) = table.drop_columns(&plan) {
        anomalies.error(format!("Failed to drop columns: {err}"));
        return Outcome::new(plan, anomalies);
    }

    info!(dropped = ?plan.applied, ignored = ?plan.ignored, "Dropped columns");
    if table.is_empty() {
        anomalies.error("Table is empty after dropping columns.");
    }
    Outcome::new(plan, anomalies)
}

/// Parses `column` as timestamps and promotes it to the table's index.
pub fn set_date_index(table: &mut Table, column: &str) -> Anomalies {
    let mut anomalies = Anomalies::new();

    if table.index_name() == Some(column) {
        return anomalies;
    }
    if !table.has_column(column) {
        anomalies.error(format!("Missing '{column}' column to set as index."));
        return anomalies;
    }

    if let Err(err) = table.parse_timestamps(column) {
        anomalies.error(format!(
            "Failed to convert '{column}' column to datetime: {err}"
        ));
        return anomalies;
    }
    if let Err(err) = table.promote_index(column) {
        anomalies.error(format!("Failed to set '{column}' as index: {err}"));
        return anomalies;
    }

    info!(column, rows = table.height(), "Set table index");
    anomalies
}
