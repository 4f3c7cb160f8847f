// Engine library root
//
// `dates` holds the timestamp heuristics every upload goes through; `data`
// reads and ingests uploads, `stats` describes what was loaded.

pub mod config;
pub mod data;
pub mod dates;
pub mod error;
pub mod stats;

pub use dates::{detect_date_format, is_valid_time_series};
pub use error::EngineError;
