//! Result types returned by the engine.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Payslip, ReimbursementRequest};

/// The outcome of a committed payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollRunSummary {
    /// The period that was finalized.
    pub period_id: Uuid,
    /// Number of payslips written.
    pub payslips_generated: usize,
}

/// One employee's line in a period summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTakeHome {
    /// The employee paid.
    pub employee_id: Uuid,
    /// The employee's display name, empty if the employee no longer exists.
    pub display_name: String,
    /// Take-home pay for the period.
    pub take_home_pay: Decimal,
}

/// Take-home pay of every employee paid for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    /// The period summarized.
    pub period_id: Uuid,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// When payroll finalized the period, if it has been run.
    pub processed_at: Option<DateTime<Utc>>,
    /// One line per payslip, ordered by display name.
    pub employees: Vec<EmployeeTakeHome>,
    /// Sum of take-home pay across every line.
    pub total_take_home_pay: Decimal,
}

/// An employee's payslip together with what it paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayslipDetail {
    /// The stored payslip.
    pub payslip: Payslip,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Reimbursement requests the run paid.
    pub reimbursements: Vec<ReimbursementRequest>,
}
