//! Employee model.
//!
//! This module defines the Employee struct as seen by payroll: an identity,
//! a display name and a monthly base salary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents an employee on the payroll.
///
/// The salary is read at run time and copied into each payslip, so later
/// salary changes never alter an already generated payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: Uuid,
    /// The name shown on payslip summaries.
    pub display_name: String,
    /// Base salary for a full period of attendance.
    pub salary: Decimal,
}

impl Employee {
    /// Creates an employee with a freshly generated id.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::Employee;
    /// use rust_decimal::Decimal;
    ///
    /// let employee = Employee::new("jdoe", Decimal::new(8_000_000, 2));
    /// assert_eq!(employee.display_name, "jdoe");
    /// assert!(!employee.id.is_nil());
    /// ```
    pub fn new(display_name: impl Into<String>, salary: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            salary,
        }
    }
}
