//! Attendance and overtime records.
//!
//! Attendance is one record per employee per calendar day. Overtime is
//! submitted per day in whole hours, bounded by [`OvertimeHours`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};

use super::amount::{deserialize_positive, ensure_positive};

/// A single day of attendance for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee who checked in.
    pub employee_id: Uuid,
    /// The period the attendance was submitted against.
    pub period_id: Uuid,
    /// The calendar date attended.
    pub date: NaiveDate,
    /// The exact check-in time.
    pub check_in_time: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Creates an attendance record with a freshly generated id.
    pub fn new(
        employee_id: Uuid,
        period_id: Uuid,
        date: NaiveDate,
        check_in_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            period_id,
            date,
            check_in_time,
        }
    }
}

/// Whole overtime hours for a single day, always between 1 and 3.
///
/// Deserialization goes through the same check, so an out-of-range value
/// cannot enter the system from a seed file or request body either.
///
/// # Example
///
/// ```
/// use payroll_engine::models::OvertimeHours;
///
/// assert_eq!(OvertimeHours::new(2).unwrap().get(), 2);
/// assert!(OvertimeHours::new(0).is_err());
/// assert!(OvertimeHours::new(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct OvertimeHours(u8);

impl OvertimeHours {
    /// Smallest accepted number of hours.
    pub const MIN: u32 = 1;
    /// Largest accepted number of hours.
    pub const MAX: u32 = 3;

    /// Validates and wraps a number of hours.
    pub fn new(hours: u32) -> PayrollResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&hours) {
            return Err(PayrollError::InvalidOvertime { hours });
        }
        Ok(Self(hours as u8))
    }

    /// Returns the number of hours.
    pub fn get(self) -> u32 {
        u32::from(self.0)
    }

    /// Returns the number of hours as a decimal for pay arithmetic.
    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.0)
    }
}

impl TryFrom<u32> for OvertimeHours {
    type Error = PayrollError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        Self::new(hours)
    }
}

impl From<OvertimeHours> for u32 {
    fn from(hours: OvertimeHours) -> Self {
        hours.get()
    }
}

fn default_rate_multiplier() -> Decimal {
    OvertimeRecord::DEFAULT_RATE_MULTIPLIER
}

/// Overtime worked by an employee on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeRecord {
    /// Unique identifier for the record.
    pub id: Uuid,
    /// The employee who worked the overtime.
    pub employee_id: Uuid,
    /// The calendar date the overtime was worked.
    pub date: NaiveDate,
    /// Number of overtime hours.
    pub hours: OvertimeHours,
    /// Multiplier applied to the hourly rate. Always greater than zero.
    #[serde(
        default = "default_rate_multiplier",
        deserialize_with = "deserialize_positive"
    )]
    pub rate_multiplier: Decimal,
}

impl OvertimeRecord {
    /// Multiplier used when none is given.
    pub const DEFAULT_RATE_MULTIPLIER: Decimal = Decimal::TWO;

    /// Creates an overtime record, rejecting hours outside 1..=3 and a
    /// multiplier that is not positive.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::OvertimeRecord;
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    /// let record = OvertimeRecord::new(Uuid::new_v4(), date, 2, Decimal::TWO).unwrap();
    /// assert_eq!(record.hours.get(), 2);
    ///
    /// assert!(OvertimeRecord::new(Uuid::new_v4(), date, 5, Decimal::TWO).is_err());
    /// assert!(OvertimeRecord::new(Uuid::new_v4(), date, 2, Decimal::ZERO).is_err());
    /// ```
    pub fn new(
        employee_id: Uuid,
        date: NaiveDate,
        hours: u32,
        rate_multiplier: Decimal,
    ) -> PayrollResult<Self> {
        Ok(Self {
            id: Uuid::new_v4(),
            employee_id,
            date,
            hours: OvertimeHours::new(hours)?,
            rate_multiplier: ensure_positive("rate_multiplier", rate_multiplier)?,
        })
    }
}
