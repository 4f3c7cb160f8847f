// Per-column descriptive statistics
use chrono::NaiveDateTime;
use shared::models::{ColumnStats, TimeSeriesTable};

/// Statistics for every value column that holds at least one value.
pub fn column_stats(table: &TimeSeriesTable) -> Vec<ColumnStats> {
    table
        .columns
        .iter()
        .zip(table.values.iter())
        .filter_map(|(name, values)| describe(name, &table.timestamps, values))
        .collect()
}

fn describe(name: &str, timestamps: &[NaiveDateTime], values: &[Option<f64>]) -> Option<ColumnStats> {
    let present: Vec<(NaiveDateTime, f64)> = timestamps
        .iter()
        .zip(values.iter())
        .filter_map(|(ts, v)| v.map(|v| (*ts, v)))
        .collect();
    if present.is_empty() {
        return None;
    }

    let mut sorted: Vec<f64> = present.iter().map(|(_, v)| *v).collect();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };
    // Sample standard deviation (n - 1); undefined for a single value.
    let std_dev = (count > 1).then(|| {
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        var.sqrt()
    });

    let first_timestamp = present.iter().map(|(ts, _)| *ts).min()?;
    let last_timestamp = present.iter().map(|(ts, _)| *ts).max()?;

    Some(ColumnStats {
        column: name.to_string(),
        count,
        mean,
        median,
        std_dev,
        min: sorted[0],
        max: sorted[count - 1],
        first_timestamp,
        last_timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    fn table(values: Vec<Vec<Option<f64>>>, columns: &[&str]) -> TimeSeriesTable {
        TimeSeriesTable {
            name: "t.csv".to_string(),
            timestamp_column: "time".to_string(),
            timestamps: (1..=values[0].len() as u32).map(at).collect(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_stats_skip_missing_values() {
        let t = table(vec![vec![None, Some(2.0), Some(4.0), Some(9.0), None]], &["v"]);
        let stats = column_stats(&t);
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.count, 3);
        assert_close(s.mean, 5.0);
        assert_close(s.median, 4.0);
        assert_close(s.std_dev.unwrap(), 13.0_f64.sqrt());
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.first_timestamp, at(2));
        assert_eq!(s.last_timestamp, at(4));
    }

    #[test]
    fn test_even_count_median() {
        let t = table(vec![vec![Some(4.0), Some(1.0), Some(3.0), Some(2.0)]], &["v"]);
        assert_close(column_stats(&t)[0].median, 2.5);
    }

    #[test]
    fn test_single_value_has_no_std_dev() {
        let t = table(vec![vec![Some(7.0)]], &["v"]);
        let s = &column_stats(&t)[0];
        assert_eq!(s.std_dev, None);
        assert_eq!(s.first_timestamp, s.last_timestamp);
    }

    #[test]
    fn test_all_missing_column_is_omitted() {
        let t = table(vec![vec![Some(1.0), Some(2.0)], vec![None, None]], &["a", "b"]);
        let stats = column_stats(&t);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].column, "a");
    }
}
