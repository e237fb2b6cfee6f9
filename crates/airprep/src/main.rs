use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use airprep_core::config::{split_list, PipelineConfig};
use airprep_core::object_store::LocalBlobStore;
use airprep_core::outputs::open_table;
use airprep_core::pipelines::{remove_unnecessary_columns, stack_csvs_to_archive, RunReport};
use airprep_parser::TableArchive;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table as TextTable;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const EXIT_ANOMALIES: u8 = 2;
const EXIT_FAILURE: u8 = 1;

#[derive(Parser, Debug)]
#[command(author, version, about = "Air-pollution data preprocessing pipeline", long_about = None)]
struct Cli {
    /// TOML config file (falls back to AIRPREP_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Write the run report as JSON to this path instead of stdout
    #[arg(long, global = true)]
    report: Option<PathBuf>,
    /// Root directory of the local blob store
    #[arg(long, global = true)]
    store_root: Option<PathBuf>,
    /// Container (bucket) holding inputs and outputs
    #[arg(long, global = true)]
    container: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate and stack every CSV file under a prefix into one table archive
    Stack(StackArgs),
    /// Drop unneeded columns from a table archive and index it by date
    Clean(CleanArgs),
    /// Print the manifest and columns of a table archive
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
struct StackArgs {
    /// Key prefix of the source CSV files
    #[arg(long)]
    prefix: Option<String>,
    /// Key of the archive to write
    #[arg(long)]
    output: Option<String>,
}

#[derive(Args, Debug, Default)]
struct CleanArgs {
    /// Key of the archive to read
    #[arg(long)]
    input: Option<String>,
    /// Key of the archive to write
    #[arg(long)]
    output: Option<String>,
    /// Comma separated column names to drop
    #[arg(long)]
    drop: Option<String>,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// Key of the archive to inspect
    #[arg(long)]
    key: String,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os("AIRPREP_CONFIG").map(PathBuf::from));
    let mut config =
        PipelineConfig::load(config_path.as_deref()).context("failed to load configuration")?;
    if let Some(root) = cli.store_root {
        config.store_root = root;
    }
    if let Some(container) = cli.container {
        config.container = container;
    }

    let store = LocalBlobStore::new(&config.store_root);
    info!(
        store_root = %config.store_root.display(),
        container = %config.container,
        "Using local blob store"
    );

    match cli.command {
        Command::Stack(args) => {
            let prefix = args.prefix.unwrap_or(config.source_prefix);
            let output = args.output.unwrap_or(config.stacked_key);
            let report = stack_csvs_to_archive(&store, &config.container, &prefix, &output)
                .context("stack run failed")?;
            emit_report(&report, cli.report.as_deref())
        }
        Command::Clean(args) => {
            let input = args.input.unwrap_or(config.clean_input_key);
            let output = args.output.unwrap_or(config.clean_output_key);
            let columns = args
                .drop
                .map(|raw| split_list(&raw))
                .unwrap_or(config.columns_to_drop);
            let report =
                remove_unnecessary_columns(&store, &config.container, &input, &output, &columns)
                    .context("clean run failed")?;
            emit_report(&report, cli.report.as_deref())
        }
        Command::Inspect(args) => {
            let outcome = open_table(&store, &config.container, &args.key)
                .with_context(|| format!("failed to read '{}'", args.key))?;
            match outcome.value {
                Some(archive) => {
                    print_archive(&args.key, &archive);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    for anomaly in &outcome.anomalies {
                        println!("{anomaly}");
                    }
                    Ok(ExitCode::from(EXIT_ANOMALIES))
                }
            }
        }
    }
}

fn emit_report(report: &RunReport, path: Option<&Path>) -> Result<ExitCode> {
    let json = report.to_json().context("failed to serialize run report")?;
    match path {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "Wrote run report");
        }
        None => println!("{json}"),
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_ANOMALIES))
    }
}

fn print_archive(key: &str, archive: &TableArchive) {
    let manifest = &archive.manifest;
    println!("{key}");
    println!("  rows:       {}", manifest.row_count);
    println!("  created at: {}", manifest.created_at);
    println!("  sources:    {}", manifest.sources.len());
    for source in &manifest.sources {
        println!("    {} ({})", source.key, source.blake3);
    }

    let mut columns = TextTable::new();
    columns.set_header(vec!["column", "dtype", "nulls", "role"]);
    if let Some(index) = archive.table.index() {
        columns.add_row(vec![
            index.name().to_string(),
            index.dtype().to_string(),
            index.null_count().to_string(),
            "index".to_string(),
        ]);
    }
    for (name, dtype) in archive.table.dtypes() {
        let nulls = archive
            .table
            .column(&name)
            .map(|column| column.null_count().to_string())
            .unwrap_or_default();
        columns.add_row(vec![name, dtype.to_string(), nulls, String::new()]);
    }
    println!("{columns}");
}
