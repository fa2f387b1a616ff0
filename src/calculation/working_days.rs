//! Working day detection and counting.
//!
//! A working day is any Monday to Friday calendar date. Dates are plain
//! calendar dates; no time zone arithmetic is involved.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Represents the type of day for payroll purposes.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::DayType;
///
/// let day_type = DayType::Saturday;
/// assert_eq!(day_type.to_string(), "Saturday");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// Monday through Friday.
    Weekday,
    /// Saturday.
    Saturday,
    /// Sunday.
    Sunday,
}

impl std::fmt::Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayType::Weekday => write!(f, "Weekday"),
            DayType::Saturday => write!(f, "Saturday"),
            DayType::Sunday => write!(f, "Sunday"),
        }
    }
}

/// Determines the day type for a given date.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{get_day_type, DayType};
/// use chrono::NaiveDate;
///
/// // 2026-01-17 is a Saturday
/// assert_eq!(get_day_type(NaiveDate::from_ymd_opt(2026, 1, 17).unwrap()), DayType::Saturday);
/// // 2026-01-12 is a Monday
/// assert_eq!(get_day_type(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()), DayType::Weekday);
/// ```
pub fn get_day_type(date: NaiveDate) -> DayType {
    match date.weekday() {
        Weekday::Sat => DayType::Saturday,
        Weekday::Sun => DayType::Sunday,
        _ => DayType::Weekday,
    }
}

/// Counts the working days in the inclusive range `start..=end`.
///
/// Returns 0 when `end` precedes `start`. A single-day range counts 1 if
/// that day is a weekday and 0 otherwise.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::count_working_days;
/// use chrono::NaiveDate;
///
/// let monday = NaiveDate::from_ymd_opt(2026, 1, 12).unwrap();
/// let friday = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
/// let sunday = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
///
/// assert_eq!(count_working_days(monday, friday), 5);
/// assert_eq!(count_working_days(monday, sunday), 5);
/// assert_eq!(count_working_days(friday, monday), 0);
/// ```
pub fn count_working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| get_day_type(*date) == DayType::Weekday)
        .count() as u32
}
