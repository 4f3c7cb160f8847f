// Whole-table summary: size and covered date range
use shared::models::{DataSummary, TimeSeriesTable};
use shared::utils::days_spanned;

/// Summarises `table`; `files` is the number of uploads it was built from.
pub fn summarize(table: &TimeSeriesTable, files: usize) -> DataSummary {
    let start = table.timestamps.iter().min().copied();
    let end = table.timestamps.iter().max().copied();
    let days = match (start, end) {
        (Some(start), Some(end)) => days_spanned(start, end),
        _ => 0,
    };

    DataSummary {
        rows: table.row_count(),
        // The timestamp column counts too.
        columns: table.columns.len() + 1,
        files,
        start,
        end,
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn table(timestamps: Vec<NaiveDateTime>) -> TimeSeriesTable {
        let n = timestamps.len();
        TimeSeriesTable {
            name: "t.csv".to_string(),
            timestamp_column: "time".to_string(),
            timestamps,
            columns: vec!["a".to_string(), "b".to_string()],
            values: vec![vec![Some(1.0); n], vec![None; n]],
        }
    }

    #[test]
    fn test_summary_of_unsorted_rows() {
        let t = table(vec![at(1, 10, 5), at(1, 3, 22), at(2, 1, 0)]);
        let summary = summarize(&t, 2);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.columns, 3);
        assert_eq!(summary.files, 2);
        assert_eq!(summary.start, Some(at(1, 3, 22)));
        assert_eq!(summary.end, Some(at(2, 1, 0)));
        assert_eq!(summary.days, 30);
    }

    #[test]
    fn test_summary_of_empty_table() {
        let summary = summarize(&table(Vec::new()), 1);
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.start, None);
        assert_eq!(summary.end, None);
        assert_eq!(summary.days, 0);
    }
}
