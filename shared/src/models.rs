use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an ambiguous `A/B/YYYY` pair is read.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DateOrder {
    DayFirst,
    #[default]
    MonthFirst,
}

impl DateOrder {
    pub fn is_day_first(self) -> bool {
        matches!(self, DateOrder::DayFirst)
    }
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateOrder::DayFirst => write!(f, "day-first"),
            DateOrder::MonthFirst => write!(f, "month-first"),
        }
    }
}

/// A single cell as it arrives from an uploaded table, before any column typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    DateTime(NaiveDateTime),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl CellValue {
    /// The cell as a number: integers and floats directly, text when it parses as `f64`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(x) => Some(*x),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::DateTime(_) => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// An ingested table: one parsed timestamp per row plus numeric value columns.
///
/// Value columns are stored column-major; `values[c][r]` is row `r` of `columns[c]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    pub name: String,
    pub timestamp_column: String,
    pub timestamps: Vec<NaiveDateTime>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl TimeSeriesTable {
    pub fn row_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn column_values(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| self.values[idx].as_slice())
    }

    /// Keeps only the rows whose calendar date falls within `[from, to]`.
    pub fn filter_dates(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> TimeSeriesTable {
        let keep: Vec<usize> = self
            .timestamps
            .iter()
            .enumerate()
            .filter(|(_, ts)| from.map_or(true, |start| ts.date() >= start))
            .filter(|(_, ts)| to.map_or(true, |end| ts.date() <= end))
            .map(|(idx, _)| idx)
            .collect();

        TimeSeriesTable {
            name: self.name.clone(),
            timestamp_column: self.timestamp_column.clone(),
            timestamps: keep.iter().map(|&r| self.timestamps[r]).collect(),
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(|col| keep.iter().map(|&r| col[r]).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub first_timestamp: NaiveDateTime,
    pub last_timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub rows: usize,
    pub columns: usize,
    pub files: usize,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub days: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_as_number() {
        assert_eq!(CellValue::Integer(4).as_number(), Some(4.0));
        assert_eq!(CellValue::Float(2.5).as_number(), Some(2.5));
        assert_eq!(CellValue::from(" 1e3 ").as_number(), Some(1000.0));
        assert_eq!(CellValue::from("north").as_number(), None);

        let ts = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(6, 0, 0).unwrap();
        assert_eq!(CellValue::DateTime(ts).as_number(), None);
    }

    #[test]
    fn test_cell_value_display() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(6, 30, 0).unwrap();
        assert_eq!(CellValue::DateTime(ts).to_string(), "2024-03-09 06:30:00");
        assert_eq!(CellValue::Integer(20240309).to_string(), "20240309");
    }
}
