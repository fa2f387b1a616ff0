//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{ErrorKind, PayrollError};
use crate::models::ActorType;
use crate::payroll::RequestContext;

use super::request::{
    CreatePeriodRequest, PayslipQuery, REQUEST_ID_HEADER, RunPayrollRequest,
    SubmitOvertimeRequest, SubmitReimbursementRequest, correlation_id, request_context,
};
use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll", post(run_payroll_handler))
        .route("/periods", post(create_period_handler))
        .route("/periods/:period_id/summary", get(period_summary_handler))
        .route("/employees/:employee_id/payslip", get(employee_payslip_handler))
        .route("/attendance", post(submit_attendance_handler))
        .route("/overtime", post(submit_overtime_handler))
        .route("/reimbursements", post(submit_reimbursement_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T, correlation_id: &str) -> Response {
    let mut response = (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(correlation_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

fn error_response(error: ApiErrorResponse, correlation_id: &str) -> Response {
    json_response(error.status, error.error, correlation_id)
}

/// Logs an engine error at the level its kind warrants and renders it.
fn engine_error(err: PayrollError, correlation_id: &str) -> Response {
    if err.kind() == ErrorKind::Internal {
        error!(correlation_id = %correlation_id, error = %err, "Request failed");
    } else {
        warn!(correlation_id = %correlation_id, error = %err, "Request rejected");
    }
    error_response(err.into(), correlation_id)
}

fn json_rejection(rejection: JsonRejection, correlation_id: &str) -> ApiError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(correlation_id = %correlation_id, error = %body_text, "JSON data error");
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(correlation_id = %correlation_id, error = %err, "JSON syntax error");
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    }
}

/// Handler for POST /payroll.
///
/// Runs payroll for the period named in the body.
async fn run_payroll_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RunPayrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = correlation_id(&headers);
    info!(correlation_id = %correlation_id, "Processing payroll run request");

    let context = match request_context(&headers, &correlation_id, ActorType::Admin) {
        Ok(context) => context,
        Err(err) => return error_response(ApiErrorResponse::bad_request(err), &correlation_id),
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = json_rejection(rejection, &correlation_id);
            return error_response(ApiErrorResponse::bad_request(err), &correlation_id);
        }
    };

    let start_time = Instant::now();
    match state.engine().run_payroll(request.period_id, &context).await {
        Ok(summary) => {
            info!(
                correlation_id = %correlation_id,
                period_id = %summary.period_id,
                payslips_generated = summary.payslips_generated,
                duration_us = start_time.elapsed().as_micros(),
                "Payroll run completed successfully"
            );
            json_response(StatusCode::OK, summary, &correlation_id)
        }
        Err(err) => engine_error(err, &correlation_id),
    }
}

/// Handler for POST /periods.
async fn create_period_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreatePeriodRequest>, JsonRejection>,
) -> Response {
    let correlation_id = correlation_id(&headers);

    let context = match request_context(&headers, &correlation_id, ActorType::Admin) {
        Ok(context) => context,
        Err(err) => return error_response(ApiErrorResponse::bad_request(err), &correlation_id),
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = json_rejection(rejection, &correlation_id);
            return error_response(ApiErrorResponse::bad_request(err), &correlation_id);
        }
    };

    match state
        .engine()
        .create_period(request.start_date, request.end_date, &context)
        .await
    {
        Ok(period) => json_response(StatusCode::CREATED, period, &correlation_id),
        Err(err) => engine_error(err, &correlation_id),
    }
}

/// Handler for GET /periods/{period_id}/summary.
async fn period_summary_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(period_id): Path<Uuid>,
) -> Response {
    let correlation_id = correlation_id(&headers);

    match state.engine().period_summary(period_id).await {
        Ok(summary) => json_response(StatusCode::OK, summary, &correlation_id),
        Err(err) => engine_error(err, &correlation_id),
    }
}

/// Handler for GET /employees/{employee_id}/payslip?period_id=...
async fn employee_payslip_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(employee_id): Path<Uuid>,
    query: Result<Query<PayslipQuery>, QueryRejection>,
) -> Response {
    let correlation_id = correlation_id(&headers);

    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
            let err = ApiError::validation_error(rejection.body_text());
            return error_response(ApiErrorResponse::bad_request(err), &correlation_id);
        }
    };

    match state
        .engine()
        .employee_payslip(employee_id, query.period_id)
        .await
    {
        Ok(detail) => json_response(StatusCode::OK, detail, &correlation_id),
        Err(err) => engine_error(err, &correlation_id),
    }
}

/// Builds an employee context for the submission routes.
fn submitter_context(headers: &HeaderMap, correlation_id: &str) -> Result<RequestContext, Response> {
    request_context(headers, correlation_id, ActorType::Employee)
        .map_err(|err| error_response(ApiErrorResponse::bad_request(err), correlation_id))
}

/// Handler for POST /attendance.
///
/// Records today's attendance for the calling employee.
async fn submit_attendance_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let correlation_id = correlation_id(&headers);
    let context = match submitter_context(&headers, &correlation_id) {
        Ok(context) => context,
        Err(response) => return response,
    };

    match state.engine().submit_attendance(Utc::now(), &context).await {
        Ok(record) => json_response(StatusCode::CREATED, record, &correlation_id),
        Err(err) => engine_error(err, &correlation_id),
    }
}

/// Handler for POST /overtime.
async fn submit_overtime_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubmitOvertimeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = correlation_id(&headers);
    let context = match submitter_context(&headers, &correlation_id) {
        Ok(context) => context,
        Err(response) => return response,
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = json_rejection(rejection, &correlation_id);
            return error_response(ApiErrorResponse::bad_request(err), &correlation_id);
        }
    };

    match state
        .engine()
        .submit_overtime(request.date, request.hours, Utc::now(), &context)
        .await
    {
        Ok(record) => json_response(StatusCode::CREATED, record, &correlation_id),
        Err(err) => engine_error(err, &correlation_id),
    }
}

/// Handler for POST /reimbursements.
async fn submit_reimbursement_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubmitReimbursementRequest>, JsonRejection>,
) -> Response {
    let correlation_id = correlation_id(&headers);
    let context = match submitter_context(&headers, &correlation_id) {
        Ok(context) => context,
        Err(response) => return response,
    };
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = json_rejection(rejection, &correlation_id);
            return error_response(ApiErrorResponse::bad_request(err), &correlation_id);
        }
    };

    match state
        .engine()
        .submit_reimbursement(request.amount, &request.description, Utc::now(), &context)
        .await
    {
        Ok(created) => json_response(StatusCode::CREATED, created, &correlation_id),
        Err(err) => engine_error(err, &correlation_id),
    }
}
