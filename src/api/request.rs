//! Request types for the payroll API.
//!
//! This module defines the JSON request bodies and the header-derived
//! caller identity attached to every request.

use axum::http::HeaderMap;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::ActorType;
use crate::payroll::RequestContext;

use super::response::ApiError;

/// Header carrying the acting user's id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the acting user's type ("admin", "employee", "system").
pub const ACTOR_TYPE_HEADER: &str = "x-actor-type";
/// Header carrying the request's correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Header carrying the client address set by a proxy.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Request body for `POST /payroll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPayrollRequest {
    /// The attendance period to run payroll for.
    pub period_id: Uuid,
}

/// Request body for `POST /periods`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePeriodRequest {
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
}

/// Request body for `POST /overtime`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitOvertimeRequest {
    /// The day the overtime was worked.
    pub date: NaiveDate,
    /// Whole hours worked, 1 to 3.
    pub hours: u32,
}

/// Request body for `POST /reimbursements`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReimbursementRequest {
    /// The amount to reimburse.
    pub amount: Decimal,
    /// What the expense was for.
    pub description: String,
}

/// Query string of `GET /employees/{employee_id}/payslip`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayslipQuery {
    /// The period whose payslip is requested.
    pub period_id: Uuid,
}

/// Returns the request's correlation id, generating one if the caller sent none.
pub fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Builds the caller's identity from request headers.
///
/// `X-Actor-Id` is required. `X-Actor-Type` defaults to `default_actor_type`,
/// and the source address is the first `X-Forwarded-For` hop or "unknown".
pub fn request_context(
    headers: &HeaderMap,
    correlation_id: &str,
    default_actor_type: ActorType,
) -> Result<RequestContext, ApiError> {
    let actor_id = headers
        .get(ACTOR_ID_HEADER)
        .ok_or_else(|| ApiError::missing_header(ACTOR_ID_HEADER))?
        .to_str()
        .ok()
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
        .ok_or_else(|| ApiError::validation_error("X-Actor-Id must be a UUID"))?;

    let actor_type = match headers.get(ACTOR_TYPE_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| ApiError::validation_error("X-Actor-Type must be ASCII"))?
            .trim()
            .parse::<ActorType>()
            .map_err(ApiError::validation_error)?,
        None => default_actor_type,
    };

    let source_address = headers
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("unknown");

    Ok(RequestContext::new(actor_id, actor_type, source_address).with_correlation_id(correlation_id))
}
