// Descriptive statistics over ingested tables
pub mod column;
pub mod summary;

pub use column::column_stats;
pub use summary::summarize;
