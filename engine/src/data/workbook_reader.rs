// Excel uploads: the first worksheet, first row as headers.
use calamine::{open_workbook_auto, Data, DataType, Reader};
use shared::models::CellValue;
use std::path::Path;

use crate::data::csv_parser::{header_names, is_missing, RawTable};
use crate::error::EngineError;

/// File extensions read as workbooks rather than CSV.
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xls"];

pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| WORKBOOK_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

pub fn read_workbook(path: impl AsRef<Path>) -> Result<RawTable, EngineError> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EngineError::DataFormatError(format!("{}: workbook has no worksheets", path.display())))??;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| EngineError::DataFormatError("Missing header row".to_string()))?;
    let header_cells: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();
    if header_cells.iter().all(|name| name.trim().is_empty()) {
        return Err(EngineError::DataFormatError("Missing header row".to_string()));
    }
    let headers = header_names(header_cells.iter().map(String::as_str));

    let mut columns: Vec<Vec<Option<CellValue>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (column, cell) in columns.iter_mut().zip(row.iter()) {
            column.push(cell_value(cell));
        }
    }

    let table = RawTable { headers, columns };
    tracing::debug!(columns = table.column_count(), rows = table.row_count(), "Read worksheet");
    Ok(table)
}

/// Maps a worksheet cell to a typed cell; blanks, error cells and missing-value text are `None`.
pub fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if is_missing(s) => None,
        Data::String(s) => Some(CellValue::Text(s.trim().to_string())),
        Data::Int(i) => Some(CellValue::Integer(*i)),
        Data::Float(x) if x.is_nan() => None,
        Data::Float(x) => Some(CellValue::Float(*x)),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(ts) => Some(CellValue::DateTime(ts)),
            None => Some(CellValue::Text(cell.to_string())),
        },
        other => Some(CellValue::Text(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_workbook_extensions() {
        assert!(is_workbook(Path::new("readings.xlsx")));
        assert!(is_workbook(Path::new("READINGS.XLS")));
        assert!(!is_workbook(Path::new("readings.csv")));
        assert!(!is_workbook(Path::new("readings")));
    }

    #[test]
    fn test_cell_values_keep_their_type() {
        assert_eq!(cell_value(&Data::Int(7)), Some(CellValue::Integer(7)));
        assert_eq!(cell_value(&Data::Float(2.5)), Some(CellValue::Float(2.5)));
        assert_eq!(
            cell_value(&Data::String(" 2024-01-01 ".to_string())),
            Some(CellValue::Text("2024-01-01".to_string()))
        );
        assert_eq!(cell_value(&Data::Bool(true)), Some(CellValue::Text("true".to_string())));
    }

    #[test]
    fn test_blank_and_missing_cells_are_none() {
        assert_eq!(cell_value(&Data::Empty), None);
        assert_eq!(cell_value(&Data::String("N/A".to_string())), None);
        assert_eq!(cell_value(&Data::Float(f64::NAN)), None);
        assert_eq!(cell_value(&Data::Error(calamine::CellErrorType::NA)), None);
    }

    #[test]
    fn test_iso_datetime_cells_become_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(6, 30, 0).unwrap();
        assert_eq!(
            cell_value(&Data::DateTimeIso("2024-03-09T06:30:00".to_string())),
            Some(CellValue::DateTime(expected))
        );
    }

    #[test]
    fn test_unreadable_workbook_is_an_error() {
        let mut file = Builder::new().suffix(".xlsx").tempfile().unwrap();
        writeln!(file, "date,value\n2024-01-01,1").unwrap();
        let result = read_workbook(file.path());
        assert!(matches!(result, Err(EngineError::WorkbookError { .. })));
    }
}
