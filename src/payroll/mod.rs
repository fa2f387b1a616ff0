//! Payroll run orchestration.
//!
//! [`PayrollEngine`] validates and locks a period, aggregates every
//! employee's payslip and commits the results, the reimbursement claims,
//! the period finalization and an audit entry in one unit of work. It also
//! creates periods, accepts employee submissions and answers payslip
//! queries.

mod audit;
mod context;
mod engine;
mod phase;
mod submission;
mod summary;

pub use audit::{
    ACTION_CREATE_ATTENDANCE_PERIOD, ACTION_RUN_PAYROLL, ACTION_RUN_PAYROLL_ZERO_WORKING_DAYS,
    ACTION_SUBMIT_ATTENDANCE, ACTION_SUBMIT_OVERTIME, ACTION_SUBMIT_REIMBURSEMENT, AuditRecorder,
    TARGET_ATTENDANCE_PERIOD, TARGET_ATTENDANCE_RECORD, TARGET_OVERTIME_RECORD,
    TARGET_REIMBURSEMENT_REQUEST,
};
pub use context::RequestContext;
pub use engine::PayrollEngine;
pub use phase::RunPhase;
pub use submission::SAME_DAY_OVERTIME_FROM_HOUR;
pub use summary::{EmployeeTakeHome, PayrollRunSummary, PayslipDetail, PeriodSummary};
