// Date/time parsing for raw spreadsheet cells.
//
// A value is split into its date words, time words and zone, and each part is
// matched against an ordered table of chrono formats. `Strict` is used to
// decide whether a value is a timestamp at all, `Lenient` once a column is
// known to hold timestamps and only the day/month order is in question.
use chrono::format::{parse, Parsed, StrftimeItems};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use shared::models::DateOrder;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("empty date string")]
    Empty,

    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),

    #[error("incomplete date: {0}")]
    Incomplete(&'static str),

    #[error("'{0}' does not match any known date or time format")]
    NoMatchingFormat(String),

    #[error("invalid zone offset '{0}'")]
    InvalidOffset(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Date tokens only. Connecting words (`at`, `on`, `of`), ordinal suffixes,
    /// commas and a weekday name are allowed, anything else is rejected.
    Strict,
    /// Additionally drops quotes, stray punctuation and the word `the`.
    Lenient,
}

const JUMP_WORDS: &[&str] = &["at", "on", "of", "and", "t"];
const LENIENT_WORDS: &[&str] = &["the"];
const ORDINAL_SUFFIXES: &[&str] = &["st", "nd", "rd", "th"];
const WEEKDAYS: &[&str] = &[
    "mon", "monday", "tue", "tues", "tuesday", "wed", "wednesday", "thu", "thur", "thurs",
    "thursday", "fri", "friday", "sat", "saturday", "sun", "sunday",
];

const YEAR_MONTH_DAY: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const YEAR_DAY_MONTH: &[&str] = &["%Y-%d-%m", "%Y/%d/%m", "%Y.%d.%m"];
const DAY_MONTH_YEAR: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const MONTH_DAY_YEAR: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y"];
// `%b` accepts full month names too.
const NAMED_MONTH: &[&str] = &["%d %b %Y", "%b %d %Y", "%Y %b %d"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S%.f %p", "%I:%M %p"];

fn month_abbrev(word: &str) -> Option<&'static str> {
    let abbrev = match word {
        "jan" | "january" => "jan",
        "feb" | "february" => "feb",
        "mar" | "march" => "mar",
        "apr" | "april" => "apr",
        "may" => "may",
        "jun" | "june" => "jun",
        "jul" | "july" => "jul",
        "aug" | "august" => "aug",
        "sep" | "sept" | "september" => "sep",
        "oct" | "october" => "oct",
        "nov" | "november" => "nov",
        "dec" | "december" => "dec",
        _ => return None,
    };
    Some(abbrev)
}

fn is_date_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '/' | '.' | ':' | '+')
}

fn is_meridiem(word: &str) -> bool {
    word == "am" || word == "pm"
}

fn all_digits(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
}

/// The parts of a value once connecting words and decorations are gone.
#[derive(Debug, Default)]
struct Pieces {
    date: Vec<String>,
    time: Vec<String>,
    offset: Option<String>,
}

/// Parses date strings into naive UTC timestamps.
///
/// `order` decides how a year-last pair such as `03/04/2023` is read. When the
/// hinted reading would put a value above 12 in the month slot, the swapped
/// reading is used instead. Year-first dates (`2023-04-03`) stay
/// year-month-day unless [`DateParser::with_year_first_hint`] is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParser {
    mode: ParseMode,
    order: DateOrder,
    year_first_hint: bool,
}

impl DateParser {
    pub fn new(mode: ParseMode, order: DateOrder) -> Self {
        DateParser {
            mode,
            order,
            year_first_hint: false,
        }
    }

    pub fn strict() -> Self {
        Self::new(ParseMode::Strict, DateOrder::MonthFirst)
    }

    pub fn lenient(order: DateOrder) -> Self {
        Self::new(ParseMode::Lenient, order)
    }

    /// Lets a day-first hint reorder year-first dates as well: `2023-01-02`
    /// becomes 1 February whenever its last field can be a month.
    pub fn with_year_first_hint(mut self) -> Self {
        self.year_first_hint = true;
        self
    }

    pub fn parse(&self, input: &str) -> Result<NaiveDateTime, DateParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DateParseError::Empty);
        }

        let pieces = self.split_pieces(trimmed)?;
        if pieces.date.is_empty() {
            return Err(if pieces.time.is_empty() {
                DateParseError::Incomplete("day, month and year are required")
            } else {
                DateParseError::Incomplete("time without a date")
            });
        }

        let date = self.parse_date(&pieces.date.join(" "))?;
        let time = if pieces.time.is_empty() {
            NaiveTime::MIN
        } else {
            parse_time(&pieces.time.join(" "))?
        };
        let timestamp = date.and_time(time);

        let offset = match &pieces.offset {
            Some(text) => offset_seconds(text)?,
            None => 0,
        };
        Ok(timestamp - Duration::seconds(offset))
    }

    fn split_pieces(&self, value: &str) -> Result<Pieces, DateParseError> {
        let lenient = self.mode == ParseMode::Lenient;
        let mut words = Vec::new();
        for raw in value.split(|c: char| c.is_whitespace() || c == ',') {
            let word: String = if lenient {
                raw.chars().filter(|c| is_date_char(*c)).collect()
            } else {
                raw.to_string()
            };
            if word.is_empty() {
                continue;
            }
            if let Some(bad) = word.chars().find(|c| !is_date_char(*c)) {
                return Err(DateParseError::UnexpectedToken(bad.to_string()));
            }
            explode(&word.to_ascii_lowercase(), &mut words);
        }

        let mut pieces = Pieces::default();
        for (idx, word) in words.iter().enumerate() {
            let word = word.as_str();
            if let Some(month) = month_abbrev(word) {
                pieces.date.push(month.to_string());
            } else if WEEKDAYS.contains(&word)
                || JUMP_WORDS.contains(&word)
                || (lenient && LENIENT_WORDS.contains(&word))
                || matches!(word, "z" | "utc" | "gmt")
            {
                // A zone name is the same as no offset.
                continue;
            } else if is_meridiem(word) || word.contains(':') {
                pieces.time.push(word.to_string());
            } else if all_digits(word) && words.get(idx + 1).map_or(false, |next| is_meridiem(next)) {
                pieces.time.push(format!("{}:00", word));
            } else if (word.starts_with('+') || word.starts_with('-')) && !pieces.time.is_empty() {
                if pieces.offset.replace(word.to_string()).is_some() {
                    return Err(DateParseError::UnexpectedToken(word.to_string()));
                }
            } else if word.bytes().any(|b| b.is_ascii_digit()) {
                pieces.date.push(word.to_string());
            } else if lenient && !word.bytes().any(|b| b.is_ascii_alphabetic()) {
                continue;
            } else {
                return Err(DateParseError::UnexpectedToken(word.to_string()));
            }
        }
        Ok(pieces)
    }

    fn parse_date(&self, text: &str) -> Result<NaiveDate, DateParseError> {
        // Without a run of three or more digits the year is a two-digit `%y`.
        let short_year = !text.split(|c: char| !c.is_ascii_digit()).any(|run| run.len() >= 3);
        self.date_formats(text)
            .into_iter()
            .find_map(|format| {
                if short_year {
                    NaiveDate::parse_from_str(text, &format.replace("%Y", "%y")).ok()
                } else {
                    NaiveDate::parse_from_str(text, format).ok()
                }
            })
            .ok_or_else(|| DateParseError::NoMatchingFormat(text.to_string()))
    }

    /// Candidate formats for `text`, most likely reading first.
    fn date_formats(&self, text: &str) -> Vec<&'static str> {
        if all_digits(text) {
            return match text.len() {
                8 => vec!["%Y%m%d"],
                6 => vec!["%y%m%d"],
                _ => Vec::new(),
            };
        }
        if text.bytes().any(|b| b.is_ascii_alphabetic()) {
            return NAMED_MONTH.to_vec();
        }

        let leading_digits = text.bytes().take_while(u8::is_ascii_digit).count();
        let day_first = self.order.is_day_first();
        if leading_digits == 4 {
            if day_first && self.year_first_hint {
                [YEAR_DAY_MONTH, YEAR_MONTH_DAY].concat()
            } else {
                YEAR_MONTH_DAY.to_vec()
            }
        } else if day_first {
            [DAY_MONTH_YEAR, MONTH_DAY_YEAR].concat()
        } else {
            [MONTH_DAY_YEAR, DAY_MONTH_YEAR].concat()
        }
    }
}

/// Splits one lowercased word into the pieces the classifier understands:
/// `2023-01-05t10:00z` becomes `2023-01-05`, `10:00`, `z`.
fn explode(word: &str, out: &mut Vec<String>) {
    let bytes = word.as_bytes();
    let iso_t = (1..bytes.len().saturating_sub(1))
        .find(|&i| bytes[i] == b't' && bytes[i - 1].is_ascii_digit() && bytes[i + 1].is_ascii_digit());
    if let Some(i) = iso_t {
        explode(&word[..i], out);
        explode(&word[i + 1..], out);
        return;
    }

    let mut word = word;
    let mut zone = None;
    if word.len() > 1 && word.ends_with('z') && word[..word.len() - 1].ends_with(|c: char| c.is_ascii_digit()) {
        word = &word[..word.len() - 1];
        zone = Some("z");
    }

    if let Some(colon) = word.find(':') {
        if let Some(sign) = word[colon..].find(['+', '-']) {
            out.push(word[..colon + sign].to_string());
            out.push(word[colon + sign..].to_string());
            out.extend(zone.map(str::to_string));
            return;
        }
    }

    if word.len() > 2 && (word.ends_with("am") || word.ends_with("pm")) {
        let (head, meridiem) = word.split_at(word.len() - 2);
        if head.ends_with(|c: char| c.is_ascii_digit()) {
            out.push(head.to_string());
            out.push(meridiem.to_string());
            return;
        }
    }

    if let Some(suffix) = ORDINAL_SUFFIXES.iter().find(|s| word.ends_with(**s)) {
        let head = &word[..word.len() - suffix.len()];
        if all_digits(head) {
            out.push(head.to_string());
            return;
        }
    }

    if word.bytes().any(|b| b.is_ascii_alphabetic()) && word.contains(['-', '/', '.']) {
        // 15-jan-2023, sept.
        out.extend(word.split(['-', '/', '.']).filter(|part| !part.is_empty()).map(str::to_string));
        return;
    }

    out.push(word.to_string());
    out.extend(zone.map(str::to_string));
}

fn parse_time(text: &str) -> Result<NaiveTime, DateParseError> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
        .ok_or_else(|| DateParseError::NoMatchingFormat(text.to_string()))
}

// Accepts +HH, +HHMM and +HH:MM.
fn offset_seconds(text: &str) -> Result<i64, DateParseError> {
    let mut parsed = Parsed::new();
    parse(&mut parsed, text, StrftimeItems::new("%#z"))
        .and_then(|_| parsed.to_fixed_offset())
        .map(|offset| i64::from(offset.local_minus_utc()))
        .map_err(|_| DateParseError::InvalidOffset(text.to_string()))
}
