// Engine settings, loaded from a JSON file and overridden by command-line flags
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::EngineError;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Field delimiter for uploaded CSV files; a single ASCII character.
    pub csv_delimiter: String,
    /// Read ambiguous dates day-first instead of detecting the order.
    pub force_day_first: bool,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            csv_delimiter: ",".to_string(),
            force_day_first: false,
            log_filter: "info".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&raw)
            .map_err(|e| EngineError::ConfigError(format!("Invalid settings file '{}': {}", path.display(), e)))?;
        settings.delimiter()?;
        Ok(settings)
    }

    pub fn delimiter(&self) -> Result<u8, EngineError> {
        let mut chars = self.csv_delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Ok(c as u8),
            _ => Err(EngineError::ConfigError(format!(
                "CSV delimiter must be a single ASCII character, got '{}'",
                self.csv_delimiter
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.delimiter().unwrap(), b',');
        assert!(!settings.force_day_first);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let file = settings_file(r#"{ "csv_delimiter": ";" }"#);
        let settings = EngineSettings::load(file.path()).unwrap();
        assert_eq!(settings.delimiter().unwrap(), b';');
        assert!(!settings.force_day_first);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_load_full_file() {
        let file = settings_file(r#"{ "csv_delimiter": "\t", "force_day_first": true, "log_filter": "engine=debug" }"#);
        let settings = EngineSettings::load(file.path()).unwrap();
        assert_eq!(settings.delimiter().unwrap(), b'\t');
        assert!(settings.force_day_first);
        assert_eq!(settings.log_filter, "engine=debug");
    }

    #[test]
    fn test_load_rejects_bad_delimiter() {
        let file = settings_file(r#"{ "csv_delimiter": ";;" }"#);
        let err = EngineSettings::load(file.path()).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
        assert!(err.to_string().contains("single ASCII character"));
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let file = settings_file("{ not json");
        assert!(matches!(EngineSettings::load(file.path()), Err(EngineError::ConfigError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineSettings::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, EngineError::IoError { .. }));
    }
}
