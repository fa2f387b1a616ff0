//! Response types for the payroll API.
//!
//! This module defines the error response structure and the mapping from
//! engine errors to HTTP status codes.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, PayrollError};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a missing header error response.
    pub fn missing_header(name: &str) -> Self {
        Self::with_details(
            "MISSING_HEADER",
            format!("missing header: {}", name),
            format!("Required header '{}' was not provided in the request", name),
        )
    }

    /// The body returned for every internal failure.
    pub fn internal() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response carrying `error`.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<PayrollError> for ApiErrorResponse {
    fn from(error: PayrollError) -> Self {
        // Storage and configuration detail stays in the logs.
        if error.kind() == ErrorKind::Internal {
            return ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::internal(),
            };
        }

        let message = error.to_string();
        let (status, error) = match error {
            PayrollError::NotFound { period_id } => (
                StatusCode::NOT_FOUND,
                ApiError::with_details(
                    "PERIOD_NOT_FOUND",
                    message,
                    format!("No attendance period has id '{}'", period_id),
                ),
            ),
            PayrollError::PayslipNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::with_details(
                    "PAYSLIP_NOT_FOUND",
                    message,
                    "Payroll has not produced a payslip for this employee and period",
                ),
            ),
            PayrollError::AlreadyRun { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "PAYROLL_ALREADY_RUN",
                    message,
                    "A period can be processed only once",
                ),
            ),
            PayrollError::ZeroWorkingDays { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "ZERO_WORKING_DAYS",
                    message,
                    "The period has been marked processed and cannot be run again",
                ),
            ),
            PayrollError::InvalidPeriod { .. } => {
                (StatusCode::BAD_REQUEST, ApiError::new("INVALID_PERIOD", message))
            }
            PayrollError::InvalidOvertime { .. } => {
                (StatusCode::BAD_REQUEST, ApiError::new("INVALID_OVERTIME", message))
            }
            PayrollError::InvalidAmount { .. } => {
                (StatusCode::BAD_REQUEST, ApiError::new("INVALID_AMOUNT", message))
            }
            PayrollError::InvalidSubmission { .. } => {
                (StatusCode::BAD_REQUEST, ApiError::new("INVALID_SUBMISSION", message))
            }
            PayrollError::EmployeeNotFound { employee_id } => (
                StatusCode::NOT_FOUND,
                ApiError::with_details(
                    "EMPLOYEE_NOT_FOUND",
                    message,
                    format!("No employee has id '{}'", employee_id),
                ),
            ),
            PayrollError::AttendanceAlreadySubmitted { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("ATTENDANCE_ALREADY_SUBMITTED", message),
            ),
            PayrollError::Internal { .. }
            | PayrollError::Computation { .. }
            | PayrollError::ConfigNotFound { .. }
            | PayrollError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, ApiError::internal())
            }
        };
        ApiErrorResponse { status, error }
    }
}
