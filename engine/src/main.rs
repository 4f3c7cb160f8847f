// trend-plotter: load time-series CSV uploads and report how their dates were read
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use engine::config::settings::EngineSettings;
use engine::data::csv_parser::TableCsvReader;
use engine::data::ingest::{ingest_path, IngestOptions, OrderSource};
use engine::data::table_store::TableStore;
use engine::stats::{column_stats, summarize};
use serde::Serialize;
use shared::models::{ColumnStats, DataSummary, DateOrder};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "trend-plotter")]
#[command(about = "Load time-series CSV or Excel files, detect their date format and summarise them")]
#[command(version)]
struct Cli {
    /// CSV or Excel (.xlsx/.xls) files whose first column holds timestamps
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Path to a JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read ambiguous dates as DD/MM/YYYY instead of detecting the order
    #[arg(long)]
    day_first: bool,

    /// First calendar day to report (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last calendar day to report (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// CSV field delimiter, overrides the settings file
    #[arg(long)]
    delimiter: Option<String>,
}

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    order: DateOrder,
    source: OrderSource,
    dropped_rows: usize,
    skipped_columns: Vec<String>,
    summary: DataSummary,
    columns: Vec<ColumnStats>,
}

#[derive(Debug, Serialize)]
struct Rejection {
    file: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct Report {
    loaded: Vec<FileReport>,
    rejected: Vec<Rejection>,
}

struct LoadInfo {
    order: DateOrder,
    source: OrderSource,
    dropped_rows: usize,
    skipped_columns: Vec<String>,
}

fn init_tracing(default_filter: &str) {
    // RUST_LOG wins over the settings file
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// One report per stored table, in upload order, over `[from, to]`.
fn file_reports(
    store: &TableStore,
    mut load_info: HashMap<String, LoadInfo>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<FileReport>> {
    let file_count = store.len();
    let mut loaded = Vec::new();
    for name in store.file_names() {
        let Some(info) = load_info.remove(name) else {
            continue;
        };
        let filtered = store.rows_in_range(name, from, to)?;
        loaded.push(FileReport {
            file: name.clone(),
            order: info.order,
            source: info.source,
            dropped_rows: info.dropped_rows,
            skipped_columns: info.skipped_columns,
            summary: summarize(&filtered, file_count),
            columns: column_stats(&filtered),
        });
    }
    Ok(loaded)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => EngineSettings::load(path).with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => EngineSettings::default(),
    };
    if cli.day_first {
        settings.force_day_first = true;
    }
    if let Some(delimiter) = cli.delimiter {
        settings.csv_delimiter = delimiter;
    }
    init_tracing(&settings.log_filter);

    info!(files = cli.files.len(), force_day_first = settings.force_day_first, "Starting Trend Plotter");

    let reader = TableCsvReader::new(settings.delimiter()?);
    let options = IngestOptions {
        force_day_first: settings.force_day_first,
    };

    let mut store = TableStore::new();
    let mut load_info: HashMap<String, LoadInfo> = HashMap::new();
    let mut rejected = Vec::new();

    for path in &cli.files {
        let file = path.display().to_string();
        match ingest_path(path, &reader, &options) {
            Ok(outcome) => {
                let name = outcome.table.name.clone();
                if !store.insert(outcome.table) {
                    warn!(file = %file, table = %name, "A file with this name is already loaded, skipping");
                    continue;
                }
                info!(file = %file, order = %outcome.order, "Loaded");
                load_info.insert(
                    name,
                    LoadInfo {
                        order: outcome.order,
                        source: outcome.source,
                        dropped_rows: outcome.dropped_rows,
                        skipped_columns: outcome.skipped_columns,
                    },
                );
            }
            Err(e) => {
                warn!(file = %file, error = %e, rejection = e.is_rejection(), "File not loaded");
                rejected.push(Rejection { file, error: e.to_string() });
            }
        }
    }

    if store.is_empty() {
        bail!("None of the {} file(s) could be loaded", cli.files.len());
    }

    let loaded = file_reports(&store, load_info, cli.from, cli.to)?;

    let report = Report { loaded, rejected };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::TimeSeriesTable;

    fn table(name: &str, days: &[u32]) -> TimeSeriesTable {
        TimeSeriesTable {
            name: name.to_string(),
            timestamp_column: "when".to_string(),
            timestamps: days
                .iter()
                .map(|&d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
                .collect(),
            columns: vec!["v".to_string()],
            values: vec![days.iter().map(|&d| Some(f64::from(d))).collect()],
        }
    }

    fn info() -> LoadInfo {
        LoadInfo {
            order: DateOrder::MonthFirst,
            source: OrderSource::Forced,
            dropped_rows: 0,
            skipped_columns: Vec::new(),
        }
    }

    #[test]
    fn test_reports_count_every_loaded_file() {
        let mut store = TableStore::new();
        let mut load_info = HashMap::new();
        for (name, days) in [("a.csv", &[1, 2][..]), ("b.xlsx", &[3, 4, 5][..])] {
            store.insert(table(name, days));
            load_info.insert(name.to_string(), info());
        }

        let reports = file_reports(&store, load_info, None, NaiveDate::from_ymd_opt(2024, 1, 4)).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].file, "a.csv");
        assert!(reports.iter().all(|r| r.summary.files == 2));
        assert_eq!(reports[1].summary.rows, 2);
    }
}
