use airprep_parser::{CsvTableParser, SourceEntry, TableArchive};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::anomaly::Anomalies;
use crate::cleaning::{drop_columns, set_date_index, DATE_COLUMN};
use crate::consolidation::stack_tables;
use crate::error::Result;
use crate::ingestion::{load_source_tables, SourceTable};
use crate::object_store::BlobStore;
use crate::outputs::{open_table, save_table};
use crate::validation::{check_column_consistency, detect_data_anomalies};

pub const STACK_PIPELINE: &str = "stack_csvs_to_archive";
pub const CLEAN_PIPELINE: &str = "remove_unnecessary_columns";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    Loaded,
    ColumnsValidated,
    ValuesValidated,
    Stacked,
    ColumnsDropped,
    Indexed,
    Saved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Done,
    Failed,
}

/// Result of one pipeline run. An empty anomaly list means the output was written.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub pipeline: &'static str,
    /// Last stage that ran.
    pub stage: Stage,
    pub status: RunStatus,
    pub anomalies: Anomalies,
    pub row_count: Option<usize>,
    pub output_key: Option<String>,
}

impl RunReport {
    pub fn new(pipeline: &'static str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            pipeline,
            stage: Stage::Start,
            status: RunStatus::Running,
            anomalies: Anomalies::new(),
            row_count: None,
            output_key: None,
        }
    }

    fn record(&mut self, stage: Stage, anomalies: Anomalies) {
        debug!(stage = ?stage, anomalies = anomalies.len(), "Stage finished");
        self.stage = stage;
        self.anomalies.extend(anomalies);
    }

    fn halt(mut self, skipped: &str) -> Self {
        warn!(
            stage = ?self.stage,
            anomalies = self.anomalies.len(),
            "Anomalies detected; skipping {skipped}."
        );
        self.status = RunStatus::Failed;
        self
    }

    fn finish(mut self) -> Self {
        info!(
            rows = self.row_count,
            output_key = self.output_key.as_deref(),
            "No anomalies detected. Process completed successfully."
        );
        self.status = RunStatus::Done;
        self
    }

    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.anomalies.messages()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Loads every CSV file under `folder_prefix`, validates and stacks them, and writes the
/// result to `output_key`. Nothing is written when any anomaly was found.
pub fn stack_csvs_to_archive(
    store: &dyn BlobStore,
    container: &str,
    folder_prefix: &str,
    output_key: &str,
) -> Result<RunReport> {
    let mut report = RunReport::new(STACK_PIPELINE);
    let span = info_span!("pipeline", run_id = %report.run_id, pipeline = STACK_PIPELINE);
    let _guard = span.enter();
    info!(container, prefix = folder_prefix, output_key, "Starting run");

    let loaded = load_source_tables(store, container, folder_prefix, &CsvTableParser);
    report.record(Stage::Loaded, loaded.anomalies);
    let sources = loaded.value;

    report.record(Stage::ColumnsValidated, check_column_consistency(&sources));
    report.record(Stage::ValuesValidated, detect_data_anomalies(&sources));
    if !report.is_clean() {
        return Ok(report.halt("stacking and saving"));
    }

    let lineage: Vec<SourceEntry> = sources.iter().map(SourceTable::source_entry).collect();
    let stacked = stack_tables(sources.into_iter().map(|source| source.table).collect());
    report.record(Stage::Stacked, stacked.anomalies);
    if !report.is_clean() {
        return Ok(report.halt("saving"));
    }

    let table = stacked.value;
    let saved = save_table(store, container, output_key, table.as_ref(), &lineage)?;
    report.record(Stage::Saved, saved);
    if !report.is_clean() {
        return Ok(report.halt("completion"));
    }

    report.row_count = table.as_ref().map(|table| table.height());
    report.output_key = Some(output_key.to_string());
    Ok(report.finish())
}

/// Drops `columns_to_drop` from the archived table at `input_key`, indexes it by date and
/// writes it to `output_key`. Source lineage is carried over from the input archive.
pub fn remove_unnecessary_columns<S: AsRef<str>>(
    store: &dyn BlobStore,
    container: &str,
    input_key: &str,
    output_key: &str,
    columns_to_drop: &[S],
) -> Result<RunReport> {
    let mut report = RunReport::new(CLEAN_PIPELINE);
    let span = info_span!("pipeline", run_id = %report.run_id, pipeline = CLEAN_PIPELINE);
    let _guard = span.enter();
    info!(container, input_key, output_key, "Starting run");

    let loaded = open_table(store, container, input_key)?;
    report.record(Stage::Loaded, loaded.anomalies);
    let Some(TableArchive {
        manifest,
        mut table,
    }) = loaded.value
    else {
        return Ok(report.halt("column removal"));
    };

    let dropped = drop_columns(&mut table, columns_to_drop);
    report.record(Stage::ColumnsDropped, dropped.anomalies);
    if !report.is_clean() {
        return Ok(report.halt("indexing and saving"));
    }

    report.record(Stage::Indexed, set_date_index(&mut table, DATE_COLUMN));
    if !report.is_clean() {
        return Ok(report.halt("saving"));
    }

    let saved = save_table(store, container, output_key, Some(&table), &manifest.sources)?;
    report.record(Stage::Saved, saved);
    if !report.is_clean() {
        return Ok(report.halt("completion"));
    }

    report.row_count = Some(table.height());
    report.output_key = Some(output_key.to_string());
    Ok(report.finish())
}
