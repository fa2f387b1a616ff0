//! Attendance period model.
//!
//! This module contains the [`AttendancePeriod`] type: the date range a
//! payroll run is computed over, and the one-way `processed_at` marker that
//! makes the run happen at most once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an attendance period with its date range and processing state.
///
/// `processed_at` starts as `None` and is set exactly once, by the payroll
/// run that finalizes the period. It never reverts.
///
/// # Example
///
/// ```
/// use payroll_engine::models::AttendancePeriod;
/// use chrono::NaiveDate;
///
/// let period = AttendancePeriod::new(
///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
/// );
///
/// assert!(!period.is_processed());
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePeriod {
    /// Unique identifier for the period.
    pub id: Uuid,
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
    /// When payroll finalized this period, if it has been run.
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    /// The actor that created the period.
    #[serde(default)]
    pub created_by: Option<Uuid>,
    /// The actor that last updated the period.
    #[serde(default)]
    pub updated_by: Option<Uuid>,
    /// Origin address of the last write.
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl AttendancePeriod {
    /// Creates an unprocessed period with a freshly generated id.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            processed_at: None,
            created_by: None,
            updated_by: None,
            ip_address: None,
        }
    }

    /// Checks if a given date falls within this period (inclusive on both ends).
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::AttendancePeriod;
    /// use chrono::NaiveDate;
    ///
    /// let period = AttendancePeriod::new(
    ///     NaiveDate::from_ymd_opt(2026, 1, 13).unwrap(),
    ///     NaiveDate::from_ymd_opt(2026, 1, 26).unwrap(),
    /// );
    ///
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 13).unwrap())); // start date
    /// assert!(period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 26).unwrap())); // end date
    /// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 27).unwrap())); // after
    /// ```
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true once payroll has finalized this period.
    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }

    /// Finalizes the period, recording who did it and from where.
    pub fn mark_processed(&mut self, at: DateTime<Utc>, actor_id: Uuid, ip_address: &str) {
        self.processed_at = Some(at);
        self.updated_by = Some(actor_id);
        self.ip_address = Some(ip_address.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_period() -> AttendancePeriod {
        AttendancePeriod::new(
            NaiveDate::from_ymd_opt(2026, 1, 13).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 26).unwrap(),
        )
    }

    #[test]
    fn test_contains_date_before_start() {
        let period = create_period();
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2026, 1, 12).unwrap()));
    }

    #[test]
    fn test_new_period_is_unprocessed() {
        let period = create_period();
        assert!(!period.is_processed());
        assert_eq!(period.processed_at, None);
    }

    #[test]
    fn test_mark_processed_records_actor() {
        let mut period = create_period();
        let actor = Uuid::new_v4();
        let now = Utc::now();

        period.mark_processed(now, actor, "10.0.0.1");

        assert!(period.is_processed());
        assert_eq!(period.processed_at, Some(now));
        assert_eq!(period.updated_by, Some(actor));
        assert_eq!(period.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_deserialize_without_processed_at() {
        let json = r#"{
            "id": "6f1d2a8e-6f5c-4a77-9d0c-2b0f1f0c7a11",
            "start_date": "2026-01-13",
            "end_date": "2026-01-26"
        }"#;
        let period: AttendancePeriod = serde_json::from_str(json).unwrap();
        assert!(!period.is_processed());
        assert_eq!(
            period.start_date,
            NaiveDate::from_ymd_opt(2026, 1, 13).unwrap()
        );
    }
}
