//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every outcome a payroll operation can be rejected or fail with.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::payroll::RunPhase;
use crate::store::StoreError;

/// The engine-facing classification of a [`PayrollError`].
///
/// Callers that only need to decide how to respond (status code, retry,
/// user message) match on this instead of the full error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested period, employee or payslip does not exist.
    NotFound,
    /// Payroll has already been run for the period.
    AlreadyRun,
    /// The submitted record already exists.
    Conflict,
    /// The period contains no Monday to Friday dates.
    ZeroWorkingDays,
    /// The input was rejected before touching storage.
    Validation,
    /// Storage or configuration failure.
    Internal,
}

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payroll_engine::error::PayrollError;
/// use uuid::Uuid;
///
/// let period_id = Uuid::nil();
/// let error = PayrollError::NotFound { period_id };
/// assert_eq!(
///     error.to_string(),
///     "Attendance period not found: 00000000-0000-0000-0000-000000000000"
/// );
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// The attendance period does not exist.
    #[error("Attendance period not found: {period_id}")]
    NotFound {
        /// The period that was requested.
        period_id: Uuid,
    },

    /// Payroll was already run for the period.
    #[error("Payroll already run for period {period_id} at {processed_at}")]
    AlreadyRun {
        /// The period that was requested.
        period_id: Uuid,
        /// When the earlier run finalized the period.
        processed_at: DateTime<Utc>,
    },

    /// The period has no working days. The period is marked processed regardless.
    #[error("Payroll cannot be run for period {period_id} ({start_date} to {end_date}): zero working days")]
    ZeroWorkingDays {
        /// The period that was requested.
        period_id: Uuid,
        /// First day of the period.
        start_date: NaiveDate,
        /// Last day of the period.
        end_date: NaiveDate,
    },

    /// A storage operation failed; everything written in the unit of work was rolled back.
    #[error("Storage failure while {phase}: {source}")]
    Internal {
        /// What the engine was doing when storage failed.
        phase: RunPhase,
        /// The underlying storage error.
        #[source]
        source: StoreError,
    },

    /// A period could not be created from the given dates.
    #[error("Invalid attendance period: {message}")]
    InvalidPeriod {
        /// A description of what made the period invalid.
        message: String,
    },

    /// A monetary input was zero or negative.
    #[error("{field} must be greater than zero, got {value}")]
    InvalidAmount {
        /// The rejected field.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// An attendance, overtime or reimbursement submission broke a rule.
    #[error("Submission rejected: {message}")]
    InvalidSubmission {
        /// Which rule the submission broke.
        message: String,
    },

    /// The employee already submitted attendance for the date.
    #[error("Attendance already submitted by employee {employee_id} for {date}")]
    AttendanceAlreadySubmitted {
        /// The submitting employee.
        employee_id: Uuid,
        /// The date already recorded.
        date: NaiveDate,
    },

    /// The employee does not exist.
    #[error("Employee not found: {employee_id}")]
    EmployeeNotFound {
        /// The employee that was requested.
        employee_id: Uuid,
    },

    /// Pay arithmetic could not be completed, for example on decimal overflow.
    #[error("Pay computation failed: {message}")]
    Computation {
        /// What failed.
        message: String,
    },

    /// An overtime record was outside the allowed hour range.
    #[error("Overtime hours must be between 1 and 3, got {hours}")]
    InvalidOvertime {
        /// The rejected number of hours.
        hours: u32,
    },

    /// No payslip exists for the employee in the period.
    #[error("Payslip not found for employee {employee_id} in period {period_id}")]
    PayslipNotFound {
        /// The employee that was requested.
        employee_id: Uuid,
        /// The period that was requested.
        period_id: Uuid,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl PayrollError {
    /// Wraps a storage failure with the phase it happened in.
    pub fn internal(phase: RunPhase, source: StoreError) -> Self {
        PayrollError::Internal { phase, source }
    }

    /// Returns the engine-facing kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PayrollError::NotFound { .. }
            | PayrollError::PayslipNotFound { .. }
            | PayrollError::EmployeeNotFound { .. } => ErrorKind::NotFound,
            PayrollError::AlreadyRun { .. } => ErrorKind::AlreadyRun,
            PayrollError::AttendanceAlreadySubmitted { .. } => ErrorKind::Conflict,
            PayrollError::ZeroWorkingDays { .. } => ErrorKind::ZeroWorkingDays,
            PayrollError::InvalidPeriod { .. }
            | PayrollError::InvalidOvertime { .. }
            | PayrollError::InvalidAmount { .. }
            | PayrollError::InvalidSubmission { .. } => ErrorKind::Validation,
            PayrollError::Internal { .. }
            | PayrollError::Computation { .. }
            | PayrollError::ConfigNotFound { .. }
            | PayrollError::ConfigParseError { .. } => ErrorKind::Internal,
        }
    }
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;
