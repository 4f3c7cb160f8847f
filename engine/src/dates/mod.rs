// Date parsing and timestamp-column heuristics.
pub mod detect;
pub mod parser;

pub use detect::{detect_date_format, detect_date_order, is_valid_time_series, Detection, DetectionBasis};
pub use parser::{DateParseError, DateParser, ParseMode};
