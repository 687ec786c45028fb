use chrono::{Datelike, NaiveDate};

/// Primary key type; every table uses PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Timestamps are stored and handled in UTC throughout.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Parse a month filter value. Accepts `YYYY-MM` or any full date, and
/// normalizes to the first day of that month.
pub fn parse_month(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.with_day(1);
    }
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").ok()
}

/// Normalize a date to the first day of its month.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    // with_day(1) cannot fail for day 1.
    date.with_day(1).unwrap_or(date)
}
