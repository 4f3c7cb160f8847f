// Date helpers shared by the engine's reports and any front end.
use chrono::NaiveDateTime;

/// Calendar days covered by `[start, end]`, counting both ends.
pub fn days_spanned(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end.date() - start.date()).num_days() + 1
}
