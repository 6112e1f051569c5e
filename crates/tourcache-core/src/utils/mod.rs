//! Utility functions for text matching, timestamps and number formatting.

pub mod format;
pub mod time;

// Re-export commonly used functions at module level
pub use format::{contains_ignore_case, derive_city, mentions_open_all_day, round2, UNKNOWN_CITY};
pub use time::{
    format_date, format_date_range, format_datetime, format_schedule, has_not_ended, parse_timestamp,
};
