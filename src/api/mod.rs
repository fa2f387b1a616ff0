//! HTTP API module for the payroll engine.
//!
//! This module provides the REST endpoints for creating attendance
//! periods, running payroll and reading payslips and period summaries,
//! plus the employee routes for submitting attendance, overtime and
//! reimbursement requests.
//! Callers identify themselves with the `X-Actor-Id` and `X-Actor-Type`
//! headers; `X-Request-Id` is used as the correlation id when present.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    CreatePeriodRequest, PayslipQuery, RunPayrollRequest, SubmitOvertimeRequest,
    SubmitReimbursementRequest,
};
pub use response::ApiError;
pub use state::AppState;
