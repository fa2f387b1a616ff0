//! Core data models for the payroll engine.
//!
//! This module contains the records the engine reads (employees, periods,
//! attendance, overtime, reimbursements) and the records it writes
//! (payslips, audit entries).

mod amount;
mod attendance;
mod attendance_period;
mod audit;
mod employee;
mod payslip;
mod reimbursement;

pub use attendance::{AttendanceRecord, OvertimeHours, OvertimeRecord};
pub use attendance_period::AttendancePeriod;
pub use audit::{ActorType, AuditEntry};
pub use employee::Employee;
pub use payslip::Payslip;
pub use reimbursement::{ReimbursementRequest, ReimbursementStatus};
