use csv::{ReaderBuilder, Trim};
use shared::models::CellValue;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::EngineError;

/// Cell contents treated as missing values.
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "<NA>",
];

pub fn is_missing(field: &str) -> bool {
    MISSING_TOKENS.contains(&field.trim())
}

/// An uploaded table before column typing: header names plus column-major cells.
///
/// CSV cells are always `Text`; workbook cells keep the type the spreadsheet gave them.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub columns: Vec<Vec<Option<CellValue>>>,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column(&self, idx: usize) -> Option<&[Option<CellValue>]> {
        self.columns.get(idx).map(Vec::as_slice)
    }
}

/// Blank header cells get positional names so every column stays addressable.
pub(crate) fn header_names<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names
        .enumerate()
        .map(|(idx, name)| {
            let name = name.trim();
            if name.is_empty() {
                format!("Unnamed: {}", idx)
            } else {
                name.to_string()
            }
        })
        .collect()
}

pub struct TableCsvReader {
    delimiter: u8,
}

impl Default for TableCsvReader {
    fn default() -> Self {
        Self::new(b',')
    }
}

impl TableCsvReader {
    pub fn new(delimiter: u8) -> Self {
        TableCsvReader { delimiter }
    }

    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<RawTable, EngineError> {
        let file = File::open(path.as_ref())?;
        self.read_from(BufReader::new(file))
    }

    pub fn read_from<R: Read>(&self, reader: R) -> Result<RawTable, EngineError> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);

        let header_record = rdr.headers()?.clone();
        if header_record.is_empty() || header_record.iter().all(str::is_empty) {
            return Err(EngineError::DataFormatError("Missing header row".to_string()));
        }
        let headers = header_names(header_record.iter());

        let mut columns: Vec<Vec<Option<CellValue>>> = vec![Vec::new(); headers.len()];
        for result in rdr.records() {
            let record = result?;
            for (column, field) in columns.iter_mut().zip(record.iter()) {
                column.push(if is_missing(field) { None } else { Some(CellValue::from(field)) });
            }
        }

        let table = RawTable { headers, columns };
        tracing::debug!(columns = table.column_count(), rows = table.row_count(), "Read CSV table");
        Ok(table)
    }
}
