//! Payslip model.
//!
//! A payslip is written once per (employee, period) by the run that
//! finalizes the period, and never mutated afterwards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The pay computed for one employee over one attendance period.
///
/// All monetary fields are rounded to the currency's minor unit, and
/// `take_home_pay` is exactly the sum of the three pay components.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Payslip;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let payslip = Payslip {
///     id: Uuid::new_v4(),
///     employee_id: Uuid::new_v4(),
///     period_id: Uuid::new_v4(),
///     base_salary: Decimal::from(80000),
///     prorated_salary: Decimal::from(80000),
///     attendance_count: 20,
///     total_working_days: 20,
///     overtime_hours: Decimal::from(2),
///     overtime_pay: Decimal::from(2000),
///     reimbursements_total: Decimal::from(150),
///     take_home_pay: Decimal::from(82150),
///     created_by: None,
///     ip_address: None,
/// };
/// assert!(payslip.is_balanced());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier for the payslip.
    pub id: Uuid,
    /// The employee paid.
    pub employee_id: Uuid,
    /// The period paid for.
    pub period_id: Uuid,
    /// The employee's salary at run time.
    pub base_salary: Decimal,
    /// Salary scaled by attended days over working days.
    pub prorated_salary: Decimal,
    /// Distinct days attended within the period.
    pub attendance_count: u32,
    /// Monday to Friday dates in the period.
    pub total_working_days: u32,
    /// Sum of overtime hours within the period.
    pub overtime_hours: Decimal,
    /// Pay for those overtime hours.
    pub overtime_pay: Decimal,
    /// Sum of reimbursements paid by this run.
    pub reimbursements_total: Decimal,
    /// Prorated salary + overtime pay + reimbursements.
    pub take_home_pay: Decimal,
    /// The actor that ran payroll.
    #[serde(default)]
    pub created_by: Option<Uuid>,
    /// Origin address of the run.
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl Payslip {
    /// Returns true when take-home pay equals the sum of its components.
    pub fn is_balanced(&self) -> bool {
        self.take_home_pay == self.prorated_salary + self.overtime_pay + self.reimbursements_total
    }
}
