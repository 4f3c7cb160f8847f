// Upload workflow: validate the first column, pick a date order, parse the whole table.
use chrono::NaiveDateTime;
use serde::Serialize;
use shared::models::{CellValue, DateOrder, TimeSeriesTable};
use std::path::Path;

use crate::data::csv_parser::{RawTable, TableCsvReader};
use crate::data::workbook_reader::{is_workbook, read_workbook};
use crate::dates::{detect_date_order, is_valid_time_series, DateParser, DetectionBasis};
use crate::error::EngineError;

#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Skip detection and read ambiguous dates day-first.
    pub force_day_first: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OrderSource {
    Forced,
    Detected { basis: DetectionBasis },
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub table: TimeSeriesTable,
    pub order: DateOrder,
    pub source: OrderSource,
    /// Rows dropped because their timestamp cell was empty.
    pub dropped_rows: usize,
    /// Columns left out because they hold non-numeric values.
    pub skipped_columns: Vec<String>,
}

/// Reads an upload by extension (`.xlsx`/`.xls` as a workbook, anything else
/// as CSV) and ingests it under its file name.
pub fn ingest_path(path: impl AsRef<Path>, reader: &TableCsvReader, options: &IngestOptions) -> Result<IngestOutcome, EngineError> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| EngineError::ProcessingError(format!("Not a file path: '{}'", path.display())))?;
    let raw = if is_workbook(path) {
        read_workbook(path)?
    } else {
        reader.read_path(path)?
    };
    ingest_table(&name, &raw, options)
}

pub fn ingest_table(name: &str, raw: &RawTable, options: &IngestOptions) -> Result<IngestOutcome, EngineError> {
    let (timestamp_header, timestamp_cells) = match (raw.headers.first(), raw.column(0)) {
        (Some(header), Some(cells)) => (header, cells),
        _ => return Err(EngineError::DataFormatError(format!("{}: table has no columns", name))),
    };

    if !is_valid_time_series(timestamp_cells) {
        tracing::warn!(table = %name, column = %timestamp_header, "First column is not a time series, rejecting file");
        return Err(EngineError::InvalidTimeSeries {
            table: name.to_string(),
            column: timestamp_header.clone(),
        });
    }

    let (order, source) = if options.force_day_first {
        (DateOrder::DayFirst, OrderSource::Forced)
    } else {
        let detection = detect_date_order(timestamp_cells);
        (detection.order, OrderSource::Detected { basis: detection.basis })
    };

    let parsed = parse_timestamps(name, timestamp_cells, order)?;
    let kept_rows: Vec<usize> = parsed.iter().enumerate().filter(|(_, ts)| ts.is_some()).map(|(row, _)| row).collect();
    let dropped_rows = parsed.len() - kept_rows.len();
    if dropped_rows > 0 {
        tracing::warn!(table = %name, dropped_rows, "Dropped rows without a timestamp");
    }

    let mut columns = Vec::new();
    let mut values = Vec::new();
    let mut skipped_columns = Vec::new();
    for (header, cells) in raw.headers.iter().zip(raw.columns.iter()).skip(1) {
        match parse_numeric_column(cells, &kept_rows) {
            Some(column_values) => {
                columns.push(header.clone());
                values.push(column_values);
            }
            None => {
                tracing::warn!(table = %name, column = %header, "Skipping non-numeric column");
                skipped_columns.push(header.clone());
            }
        }
    }

    let table = TimeSeriesTable {
        name: name.to_string(),
        timestamp_column: timestamp_header.clone(),
        timestamps: parsed.into_iter().flatten().collect(),
        columns,
        values,
    };
    tracing::info!(
        table = %name,
        %order,
        source = ?source,
        rows = table.row_count(),
        columns = table.columns.len(),
        "Ingested table"
    );

    Ok(IngestOutcome {
        table,
        order,
        source,
        dropped_rows,
        skipped_columns,
    })
}

/// Parses every cell of a timestamp column; `None` marks a missing cell.
///
/// Cells the spreadsheet already typed as date-times are taken as they are.
pub fn parse_timestamps(table: &str, cells: &[Option<CellValue>], order: DateOrder) -> Result<Vec<Option<NaiveDateTime>>, EngineError> {
    let parser = DateParser::lenient(order);
    cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Some(CellValue::DateTime(ts)) => Ok(Some(*ts)),
            Some(value) => {
                let text = value.to_string();
                parser.parse(&text).map(Some).map_err(|e| {
                    tracing::debug!(table, row = idx + 1, value = %text, error = %e, "Timestamp failed to parse");
                    EngineError::TimestampParse {
                        table: table.to_string(),
                        row: idx + 1,
                        value: text,
                    }
                })
            }
            None => Ok(None),
        })
        .collect()
}

/// `None` when any non-null cell is not a number. Rows past the end of a
/// short column count as missing cells.
fn parse_numeric_column(cells: &[Option<CellValue>], rows: &[usize]) -> Option<Vec<Option<f64>>> {
    rows.iter()
        .map(|&row| match cells.get(row).and_then(Option::as_ref) {
            Some(value) => value.as_number().map(Some),
            None => Some(None),
        })
        .collect()
}
