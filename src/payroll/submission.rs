//! Employee submissions: attendance, overtime and reimbursement requests.
//!
//! Each submission locks the open period it lands in, so it is serialized
//! with any payroll run over that period and can never slip in after the
//! run has read its records. The record and its audit entry commit together.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};

use crate::calculation::{DayType, get_day_type};
use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    AttendancePeriod, AttendanceRecord, OvertimeHours, OvertimeRecord, ReimbursementRequest,
};
use crate::store::{
    AttendanceStore, OvertimeStore, PayrollStore, PeriodStore, ReimbursementStore, StoreError,
    UnitOfWork,
};

use super::audit::{
    ACTION_SUBMIT_ATTENDANCE, ACTION_SUBMIT_OVERTIME, ACTION_SUBMIT_REIMBURSEMENT,
    AuditRecorder, TARGET_ATTENDANCE_RECORD, TARGET_OVERTIME_RECORD,
    TARGET_REIMBURSEMENT_REQUEST,
};
use super::context::RequestContext;
use super::engine::{PayrollEngine, storage_failure};
use super::phase::RunPhase;

/// First hour (UTC) at which overtime for the current day may be submitted.
pub const SAME_DAY_OVERTIME_FROM_HOUR: u32 = 17;

const PHASE: RunPhase = RunPhase::Submitting;

fn rejected(message: impl Into<String>) -> PayrollError {
    let message = message.into();
    warn!(reason = %message, "Submission rejected");
    PayrollError::InvalidSubmission { message }
}

/// Finds the unprocessed period covering `date` and locks it.
///
/// Returns `None` if no period covers the date or the covering period was
/// processed while the lock was awaited.
async fn lock_open_period(
    uow: &mut dyn UnitOfWork,
    date: NaiveDate,
) -> Result<Option<AttendancePeriod>, StoreError> {
    let Some(candidate) = uow.find_open_period_covering(date).await? else {
        return Ok(None);
    };
    let locked = uow.find_period_for_update(candidate.id).await?;
    Ok(locked.filter(|period| !period.is_processed()))
}

impl PayrollEngine {
    async fn ensure_employee(&self, context: &RequestContext) -> PayrollResult<()> {
        let employee_id = context.actor_id;
        self.store
            .find_employee(employee_id)
            .await
            .map_err(storage_failure(PHASE))?
            .map(|_| ())
            .ok_or(PayrollError::EmployeeNotFound { employee_id })
    }

    /// Records attendance for the calling employee on the day of `checked_in_at`.
    ///
    /// # Errors
    ///
    /// - `InvalidSubmission` on a weekend, or when no unprocessed period
    ///   covers the day.
    /// - `EmployeeNotFound` if the actor is not an employee.
    /// - `AttendanceAlreadySubmitted` if the day is already recorded.
    /// - `Internal` on storage failure.
    pub async fn submit_attendance(
        &self,
        checked_in_at: DateTime<Utc>,
        context: &RequestContext,
    ) -> PayrollResult<AttendanceRecord> {
        let employee_id = context.actor_id;
        let date = checked_in_at.date_naive();
        if get_day_type(date) != DayType::Weekday {
            return Err(rejected(format!(
                "attendance cannot be submitted on a weekend ({})",
                date
            )));
        }
        self.ensure_employee(context).await?;

        let mut uow = self.store.begin().await.map_err(storage_failure(PHASE))?;
        let Some(period) = lock_open_period(uow.as_mut(), date)
            .await
            .map_err(storage_failure(PHASE))?
        else {
            return Err(rejected(format!("no unprocessed attendance period covers {}", date)));
        };

        if uow
            .find_attendance(employee_id, date)
            .await
            .map_err(storage_failure(PHASE))?
            .is_some()
        {
            warn!(%employee_id, %date, "Attendance already submitted");
            return Err(PayrollError::AttendanceAlreadySubmitted { employee_id, date });
        }

        let record = AttendanceRecord::new(employee_id, period.id, date, checked_in_at);
        uow.insert_attendance(&record)
            .await
            .map_err(storage_failure(PHASE))?;
        AuditRecorder::new(context)
            .record(
                uow.as_mut(),
                ACTION_SUBMIT_ATTENDANCE,
                TARGET_ATTENDANCE_RECORD,
                record.id,
                json!({
                    "period_id": period.id,
                    "date": record.date,
                    "check_in_time": record.check_in_time,
                }),
            )
            .await
            .map_err(storage_failure(PHASE))?;
        uow.commit().await.map_err(storage_failure(PHASE))?;

        info!(
            %employee_id,
            %date,
            period_id = %period.id,
            correlation_id = %context.correlation_id,
            "Attendance submitted"
        );
        Ok(record)
    }

    /// Records overtime for the calling employee.
    ///
    /// Overtime is accepted for a day the employee attended, inside an
    /// unprocessed period, and not in the future. Same-day overtime is only
    /// accepted from [`SAME_DAY_OVERTIME_FROM_HOUR`] onwards.
    ///
    /// # Errors
    ///
    /// - `InvalidOvertime` unless `hours` is between 1 and 3.
    /// - `InvalidSubmission` if any of the rules above fails.
    /// - `EmployeeNotFound` if the actor is not an employee.
    /// - `Internal` on storage failure.
    pub async fn submit_overtime(
        &self,
        date: NaiveDate,
        hours: u32,
        submitted_at: DateTime<Utc>,
        context: &RequestContext,
    ) -> PayrollResult<OvertimeRecord> {
        let employee_id = context.actor_id;
        let hours = OvertimeHours::new(hours)?;
        let today = submitted_at.date_naive();
        if date > today {
            return Err(rejected(format!("overtime date {} is in the future", date)));
        }
        if date == today && submitted_at.hour() < SAME_DAY_OVERTIME_FROM_HOUR {
            return Err(rejected(format!(
                "overtime for today can only be submitted from {}:00",
                SAME_DAY_OVERTIME_FROM_HOUR
            )));
        }
        self.ensure_employee(context).await?;

        let mut uow = self.store.begin().await.map_err(storage_failure(PHASE))?;
        let Some(period) = lock_open_period(uow.as_mut(), date)
            .await
            .map_err(storage_failure(PHASE))?
        else {
            return Err(rejected(format!("no unprocessed attendance period covers {}", date)));
        };
        if uow
            .find_attendance(employee_id, date)
            .await
            .map_err(storage_failure(PHASE))?
            .is_none()
        {
            return Err(rejected(format!("no attendance recorded on {}", date)));
        }

        let record = OvertimeRecord::new(
            employee_id,
            date,
            hours.get(),
            OvertimeRecord::DEFAULT_RATE_MULTIPLIER,
        )?;
        uow.insert_overtime(&record)
            .await
            .map_err(storage_failure(PHASE))?;
        AuditRecorder::new(context)
            .record(
                uow.as_mut(),
                ACTION_SUBMIT_OVERTIME,
                TARGET_OVERTIME_RECORD,
                record.id,
                json!({
                    "period_id": period.id,
                    "date": record.date,
                    "hours": record.hours.get(),
                    "rate_multiplier": record.rate_multiplier,
                }),
            )
            .await
            .map_err(storage_failure(PHASE))?;
        uow.commit().await.map_err(storage_failure(PHASE))?;

        info!(
            %employee_id,
            %date,
            hours = record.hours.get(),
            correlation_id = %context.correlation_id,
            "Overtime submitted"
        );
        Ok(record)
    }

    /// Files a pending reimbursement request for the calling employee.
    ///
    /// The request is bound to the unprocessed period covering the day of
    /// `submitted_at`, if there is one, and left unbound otherwise.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` unless `amount` is greater than zero.
    /// - `InvalidSubmission` if the description is blank.
    /// - `EmployeeNotFound` if the actor is not an employee.
    /// - `Internal` on storage failure.
    pub async fn submit_reimbursement(
        &self,
        amount: Decimal,
        description: &str,
        submitted_at: DateTime<Utc>,
        context: &RequestContext,
    ) -> PayrollResult<ReimbursementRequest> {
        let employee_id = context.actor_id;
        let mut request = ReimbursementRequest::new(employee_id, description.trim(), amount)
            .inspect_err(|err| warn!(error = %err, "Submission rejected"))?;
        self.ensure_employee(context).await?;

        let mut uow = self.store.begin().await.map_err(storage_failure(PHASE))?;
        let period = lock_open_period(uow.as_mut(), submitted_at.date_naive())
            .await
            .map_err(storage_failure(PHASE))?;
        request.period_id = period.as_ref().map(|period| period.id);
        request.updated_by = Some(employee_id);
        request.ip_address = Some(context.source_address.clone());

        uow.insert_reimbursement(&request)
            .await
            .map_err(storage_failure(PHASE))?;
        AuditRecorder::new(context)
            .record(
                uow.as_mut(),
                ACTION_SUBMIT_REIMBURSEMENT,
                TARGET_REIMBURSEMENT_REQUEST,
                request.id,
                json!({
                    "period_id": request.period_id,
                    "amount": request.amount,
                    "description": request.description,
                }),
            )
            .await
            .map_err(storage_failure(PHASE))?;
        uow.commit().await.map_err(storage_failure(PHASE))?;

        info!(
            %employee_id,
            request_id = %request.id,
            amount = %request.amount,
            correlation_id = %context.correlation_id,
            "Reimbursement submitted"
        );
        Ok(request)
    }
}
