// Timestamp column validation and day/month order detection.
//
// Both entry points are total: unparseable values only count as failures,
// and every column (empty, all-null, not a date at all) yields a verdict.
use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::Serialize;
use shared::models::DateOrder;

use super::parser::DateParser;

/// Non-null entries parsed by [`is_valid_time_series`].
pub const VALIDATION_SAMPLE_SIZE: usize = 5;
/// Non-null entries used as ordering evidence by [`detect_date_order`].
pub const DETECTION_SAMPLE_SIZE: usize = 50;

// Both the fill check and the parse check require 80%, compared as 4/5 in integers.
const RATIO_NUMERATOR: usize = 4;
const RATIO_DENOMINATOR: usize = 5;

fn meets_ratio(hits: usize, total: usize) -> bool {
    hits * RATIO_DENOMINATOR >= total * RATIO_NUMERATOR
}

/// Which branch of the detection produced the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DetectionBasis {
    /// Fewer than two non-null values; defaults to month-first.
    InsufficientSample,
    /// Exactly one reading of the sample was in chronological order.
    ChronologicalOrder,
    /// Both or neither reading was ordered; decided by the numeric-token vote.
    NumericVote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub order: DateOrder,
    pub basis: DetectionBasis,
}

/// The first `size` non-null values, rendered as strings, in column order.
pub fn sample<V: Display>(column: &[Option<V>], size: usize) -> Vec<String> {
    column.iter().flatten().take(size).map(|v| v.to_string()).collect()
}

/// Decides whether `column` plausibly holds timestamps.
///
/// At least 80% of the entries must be non-null, and at least 80% of the
/// first five non-null entries must pass the strict parser.
pub fn is_valid_time_series<V: Display>(column: &[Option<V>]) -> bool {
    if column.is_empty() {
        return false;
    }

    let non_null = column.iter().filter(|v| v.is_some()).count();
    if !meets_ratio(non_null, column.len()) {
        tracing::debug!(non_null, total = column.len(), "Rejecting column: too many missing values");
        return false;
    }

    let sample = sample(column, VALIDATION_SAMPLE_SIZE);
    if sample.is_empty() {
        return false;
    }

    let parser = DateParser::strict();
    let parsed = sample.iter().filter(|value| parser.parse(value).is_ok()).count();
    let valid = meets_ratio(parsed, sample.len());
    tracing::debug!(parsed, sampled = sample.len(), valid, "Validated timestamp sample");
    valid
}

/// Returns `true` when ambiguous dates in `column` should be read day-first.
pub fn detect_date_format<V: Display>(column: &[Option<V>]) -> bool {
    detect_date_order(column).order.is_day_first()
}

/// Chooses between day-first and month-first reading of `column`.
///
/// The sample is parsed under both readings; if exactly one of them comes out
/// in chronological order, that reading wins. Otherwise the leading numbers of
/// each value vote: a first number above 12 cannot be a month (two votes for
/// day-first), a second number above 12 cannot be a month (two votes for
/// month-first), and a first number larger than the second is a weak hint for
/// day-first (one vote). Ties go to month-first.
///
/// The vote is a best-effort guess, not a proof: a sample spanning only a few
/// days with small numbers can legitimately be read either way.
pub fn detect_date_order<V: Display>(column: &[Option<V>]) -> Detection {
    let sample = sample(column, DETECTION_SAMPLE_SIZE);
    if sample.len() < 2 {
        tracing::trace!(sampled = sample.len(), "Not enough values to detect date order");
        return Detection {
            order: DateOrder::MonthFirst,
            basis: DetectionBasis::InsufficientSample,
        };
    }

    let day_first = parse_sample(&sample, DateOrder::DayFirst);
    let month_first = parse_sample(&sample, DateOrder::MonthFirst);
    let day_first_ordered = is_chronological(&day_first);
    let month_first_ordered = is_chronological(&month_first);
    tracing::trace!(
        day_first_parsed = day_first.len(),
        month_first_parsed = month_first.len(),
        day_first_ordered,
        month_first_ordered,
        "Parsed detection sample under both orders"
    );

    if !day_first.is_empty() && !month_first.is_empty() {
        let decided = match (day_first_ordered, month_first_ordered) {
            (true, false) => Some(DateOrder::DayFirst),
            (false, true) => Some(DateOrder::MonthFirst),
            _ => None,
        };
        if let Some(order) = decided {
            tracing::debug!(%order, "Date order decided by chronological order");
            return Detection {
                order,
                basis: DetectionBasis::ChronologicalOrder,
            };
        }
    }

    let (day_votes, month_votes) = numeric_votes(&sample);
    let order = if day_votes > month_votes {
        DateOrder::DayFirst
    } else {
        DateOrder::MonthFirst
    };
    tracing::debug!(%order, day_votes, month_votes, "Date order decided by numeric vote");
    Detection {
        order,
        basis: DetectionBasis::NumericVote,
    }
}

/// Parses every value under `order`, dropping the ones that fail. Year-first
/// values follow the hint too, so `2023-01-02` reads as 1 February day-first.
fn parse_sample(sample: &[String], order: DateOrder) -> Vec<NaiveDateTime> {
    let parser = DateParser::lenient(order).with_year_first_hint();
    sample.iter().filter_map(|value| parser.parse(value).ok()).collect()
}

/// Non-decreasing: equal consecutive timestamps count as ordered.
pub fn is_chronological(timestamps: &[NaiveDateTime]) -> bool {
    timestamps.windows(2).all(|pair| pair[0] <= pair[1])
}

/// Maximal ASCII digit runs in `value`, left to right. Runs too long for a
/// `u64` saturate, which only matters for the `> 12` comparisons below.
fn digit_runs(value: &str) -> Vec<u64> {
    value
        .split(|c: char| !c.is_ascii_digit())
        .filter(|run| !run.is_empty())
        .map(|run| run.parse::<u64>().unwrap_or(u64::MAX))
        .collect()
}

fn numeric_votes(sample: &[String]) -> (u32, u32) {
    let mut day_votes = 0;
    let mut month_votes = 0;

    for value in sample {
        let numbers = digit_runs(value);
        if let [first, second, ..] = numbers[..] {
            if first > 12 {
                day_votes += 2;
            } else if second > 12 {
                month_votes += 2;
            } else if first > second {
                day_votes += 1;
            }
        }
    }
    (day_votes, month_votes)
}
