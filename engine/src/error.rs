use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Spreadsheet error: {source}")]
    WorkbookError {
        #[from]
        source: calamine::Error,
    },

    #[error("Data format error: {0}")]
    DataFormatError(String),

    // The upload is rejected as a whole when its first column fails validation.
    #[error("{table}: first column '{column}' must contain datetime values; file rejected")]
    InvalidTimeSeries { table: String, column: String },

    // Validation and detection only look at a sample, so a later row can still fail.
    #[error("{table}: row {row} has an unparseable timestamp '{value}'")]
    TimestampParse {
        table: String,
        row: usize,
        value: String,
    },

    #[error("Table store error: {0}")]
    TableStoreError(String),

    #[error("Internal processing error: {0}")]
    ProcessingError(String),
}

impl EngineError {
    /// Whether the error rejects a single upload rather than the whole run.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidTimeSeries { .. }
                | EngineError::TimestampParse { .. }
                | EngineError::DataFormatError(_)
                | EngineError::CsvSystemError { .. }
                | EngineError::WorkbookError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_time_series_message() {
        let err = EngineError::InvalidTimeSeries {
            table: "sensors.csv".to_string(),
            column: "when".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "sensors.csv: first column 'when' must contain datetime values; file rejected"
        );
        assert!(err.is_rejection());
    }

    #[test]
    fn test_timestamp_parse_message() {
        let err = EngineError::TimestampParse {
            table: "a.csv".to_string(),
            row: 7,
            value: "soon".to_string(),
        };
        assert!(err.to_string().contains("row 7"));
        assert!(err.to_string().contains("'soon'"));
    }

    #[test]
    fn test_io_error_is_not_a_rejection() {
        let err: EngineError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(err.to_string().starts_with("I/O error"));
        assert!(!err.is_rejection());
    }
}
