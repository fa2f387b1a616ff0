//! The payroll engine.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{Instrument, Span, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::calculation::{
    AggregationContext, EmployeeAggregation, EmployeeRecords, aggregate_employee,
    count_working_days,
};
use crate::config::PayrollSettings;
use crate::error::{PayrollError, PayrollResult};
use crate::models::AttendancePeriod;
use crate::store::{
    AttendanceStore, EmployeeStore, OvertimeStore, PayrollStore, PayslipStore, PeriodStore,
    ReimbursementStore, StoreError, UnitOfWork,
};

use super::audit::{
    ACTION_CREATE_ATTENDANCE_PERIOD, ACTION_RUN_PAYROLL, ACTION_RUN_PAYROLL_ZERO_WORKING_DAYS,
    AuditRecorder,
};
use super::context::RequestContext;
use super::phase::RunPhase;
use super::summary::{EmployeeTakeHome, PayrollRunSummary, PayslipDetail, PeriodSummary};

/// Wraps a storage failure with its phase and logs it.
pub(super) fn storage_failure(phase: RunPhase) -> impl FnOnce(StoreError) -> PayrollError {
    move |source| {
        error!(%phase, error = %source, "Storage failure, unit of work rolled back");
        PayrollError::internal(phase, source)
    }
}

/// Sums `values`, or returns `None` on overflow.
fn checked_total(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}

/// Runs payroll against a [`PayrollStore`].
///
/// The engine holds no state besides its store handle and settings, so one
/// instance can serve any number of concurrent requests. Mutual exclusion
/// between runs on the same period comes from the store's period lock.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use payroll_engine::config::PayrollSettings;
/// use payroll_engine::models::{ActorType, AttendancePeriod, Employee};
/// use payroll_engine::payroll::{PayrollEngine, RequestContext};
/// use payroll_engine::store::InMemoryStore;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = InMemoryStore::new();
/// store.add_employee(Employee::new("jdoe", Decimal::from(80000))).unwrap();
/// let period = AttendancePeriod::new(
///     NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
/// );
/// let period_id = period.id;
/// store.add_period(period).unwrap();
///
/// let engine = PayrollEngine::new(Arc::new(store), PayrollSettings::default());
/// let context = RequestContext::new(Uuid::new_v4(), ActorType::Admin, "127.0.0.1");
///
/// let summary = engine.run_payroll(period_id, &context).await.unwrap();
/// assert_eq!(summary.payslips_generated, 1);
/// # }
/// ```
#[derive(Clone)]
pub struct PayrollEngine {
    pub(super) store: Arc<dyn PayrollStore>,
    settings: PayrollSettings,
}

impl std::fmt::Debug for PayrollEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayrollEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PayrollEngine {
    /// Creates an engine over `store`.
    pub fn new(store: Arc<dyn PayrollStore>, settings: PayrollSettings) -> Self {
        Self { store, settings }
    }

    /// Runs payroll for a period.
    ///
    /// On success every employee has exactly one payslip for the period,
    /// every eligible reimbursement is marked paid, the period is marked
    /// processed and one `run_payroll` audit entry exists. All of it is
    /// committed together or not at all.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the period does not exist.
    /// - `AlreadyRun` if the period was processed before; nothing is written.
    /// - `ZeroWorkingDays` if the period has no Monday to Friday dates. The
    ///   period is still marked processed and audited, so it cannot be rerun.
    /// - `Internal` on any storage failure; every write is rolled back.
    /// - `Computation` if pay arithmetic overflows; nothing is written.
    pub async fn run_payroll(
        &self,
        period_id: Uuid,
        context: &RequestContext,
    ) -> PayrollResult<PayrollRunSummary> {
        let span = info_span!(
            "run_payroll",
            %period_id,
            correlation_id = %context.correlation_id
        );
        self.execute_run(period_id, context).instrument(span).await
    }

    async fn execute_run(
        &self,
        period_id: Uuid,
        context: &RequestContext,
    ) -> PayrollResult<PayrollRunSummary> {
        info!(
            actor_id = %context.actor_id,
            actor_type = %context.actor_type,
            source_address = %context.source_address,
            "Payroll run requested"
        );

        let mut uow = self
            .store
            .begin()
            .await
            .map_err(storage_failure(RunPhase::Validating))?;

        let mut period = match uow
            .find_period_for_update(period_id)
            .await
            .map_err(storage_failure(RunPhase::Validating))?
        {
            Some(period) => period,
            None => {
                warn!("Payroll rejected: period not found");
                return Err(PayrollError::NotFound { period_id });
            }
        };

        if let Some(processed_at) = period.processed_at {
            warn!(%processed_at, "Payroll rejected: period already processed");
            return Err(PayrollError::AlreadyRun {
                period_id,
                processed_at,
            });
        }

        let total_working_days = count_working_days(period.start_date, period.end_date);
        if total_working_days == 0 {
            return self.finalize_without_working_days(uow, period, context).await;
        }

        let records = Self::gather_records(uow.as_mut(), &period)
            .await
            .map_err(storage_failure(RunPhase::Computing))?;

        let aggregations = self
            .aggregate(records, &period, total_working_days, context)
            .await
            .inspect_err(|err| error!(error = %err, "Payslip computation failed, nothing written"))?;

        let total_take_home = checked_total(
            aggregations.iter().map(|aggregation| aggregation.payslip.take_home_pay),
        )
        .ok_or_else(|| {
            error!("Total take-home pay overflowed, nothing written");
            PayrollError::Computation {
                message: "total take-home pay overflowed".to_string(),
            }
        })?;
        let reimbursements_paid: usize = aggregations
            .iter()
            .map(|aggregation| aggregation.paid_reimbursements.len())
            .sum();
        debug!(
            employees = aggregations.len(),
            total_working_days,
            %total_take_home,
            reimbursements_paid,
            "Payslips computed"
        );

        period.mark_processed(Utc::now(), context.actor_id, &context.source_address);
        let payslips_generated = aggregations.len();

        Self::write_run(uow.as_mut(), &aggregations, &period, context, total_working_days)
            .await
            .map_err(storage_failure(RunPhase::Committing))?;
        uow.commit()
            .await
            .map_err(storage_failure(RunPhase::Committing))?;

        info!(
            payslips_generated,
            total_working_days,
            %total_take_home,
            "Payroll run committed"
        );

        Ok(PayrollRunSummary {
            period_id,
            payslips_generated,
        })
    }

    /// Marks a period with no working days processed and reports the failure.
    async fn finalize_without_working_days(
        &self,
        mut uow: Box<dyn UnitOfWork>,
        mut period: AttendancePeriod,
        context: &RequestContext,
    ) -> PayrollResult<PayrollRunSummary> {
        let phase = RunPhase::ZeroWorkingDays;
        period.mark_processed(Utc::now(), context.actor_id, &context.source_address);

        uow.update_period(&period)
            .await
            .map_err(storage_failure(phase))?;
        AuditRecorder::new(context)
            .record_period(
                uow.as_mut(),
                ACTION_RUN_PAYROLL_ZERO_WORKING_DAYS,
                period.id,
                json!({
                    "message": "zero working days",
                    "start_date": period.start_date,
                    "end_date": period.end_date,
                }),
            )
            .await
            .map_err(storage_failure(phase))?;
        uow.commit().await.map_err(storage_failure(phase))?;

        warn!(
            start_date = %period.start_date,
            end_date = %period.end_date,
            "Period has zero working days; marked processed without payslips"
        );

        Err(PayrollError::ZeroWorkingDays {
            period_id: period.id,
            start_date: period.start_date,
            end_date: period.end_date,
        })
    }

    /// Aggregates every employee on the blocking pool, fanning out with rayon.
    async fn aggregate(
        &self,
        records: Vec<EmployeeRecords>,
        period: &AttendancePeriod,
        total_working_days: u32,
        context: &RequestContext,
    ) -> PayrollResult<Vec<EmployeeAggregation>> {
        let period = period.clone();
        let settings = self.settings.clone();
        let actor_id = context.actor_id;
        let ip_address = context.source_address.clone();
        let span = Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let aggregation_context = AggregationContext {
                period: &period,
                total_working_days,
                hours_per_day: settings.hours_per_day,
                currency_scale: settings.currency_scale,
                actor_id,
                ip_address: &ip_address,
            };
            records
                .into_par_iter()
                .map(|records| aggregate_employee(records, &aggregation_context))
                .collect::<PayrollResult<Vec<EmployeeAggregation>>>()
        })
        .await
        .map_err(|join_error| PayrollError::Computation {
            message: format!("aggregation task failed: {}", join_error),
        })?
    }

    async fn gather_records(
        uow: &mut dyn UnitOfWork,
        period: &AttendancePeriod,
    ) -> Result<Vec<EmployeeRecords>, StoreError> {
        let employees = uow.list_employees().await?;
        let mut gathered = Vec::with_capacity(employees.len());

        for employee in employees {
            let attendance = uow
                .attendance_between(employee.id, period.start_date, period.end_date)
                .await?;
            let overtime = uow
                .overtime_between(employee.id, period.start_date, period.end_date)
                .await?;
            let reimbursements = uow.eligible_reimbursements(employee.id, period.id).await?;
            gathered.push(EmployeeRecords {
                employee,
                attendance,
                overtime,
                reimbursements,
            });
        }

        Ok(gathered)
    }

    async fn write_run(
        uow: &mut dyn UnitOfWork,
        aggregations: &[EmployeeAggregation],
        period: &AttendancePeriod,
        context: &RequestContext,
        total_working_days: u32,
    ) -> Result<(), StoreError> {
        for aggregation in aggregations {
            uow.insert_payslip(&aggregation.payslip).await?;
            for request in &aggregation.paid_reimbursements {
                uow.update_reimbursement(request).await?;
            }
        }
        uow.update_period(period).await?;

        AuditRecorder::new(context)
            .record_period(
                uow,
                ACTION_RUN_PAYROLL,
                period.id,
                json!({
                    "period_id": period.id,
                    "payslips_generated": aggregations.len(),
                    "total_working_days": total_working_days,
                }),
            )
            .await
    }

    /// Creates an unprocessed attendance period.
    ///
    /// # Errors
    ///
    /// - `InvalidPeriod` unless `end_date` is after `start_date`.
    /// - `Internal` on storage failure, reported as `CreatingPeriod`.
    pub async fn create_period(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        context: &RequestContext,
    ) -> PayrollResult<AttendancePeriod> {
        if end_date <= start_date {
            warn!(%start_date, %end_date, "Attendance period rejected");
            return Err(PayrollError::InvalidPeriod {
                message: format!("end date {} must be after start date {}", end_date, start_date),
            });
        }

        let mut period = AttendancePeriod::new(start_date, end_date);
        period.created_by = Some(context.actor_id);
        period.updated_by = Some(context.actor_id);
        period.ip_address = Some(context.source_address.clone());

        let phase = RunPhase::CreatingPeriod;
        let mut uow = self.store.begin().await.map_err(storage_failure(phase))?;
        uow.insert_period(&period)
            .await
            .map_err(storage_failure(phase))?;
        AuditRecorder::new(context)
            .record_period(
                uow.as_mut(),
                ACTION_CREATE_ATTENDANCE_PERIOD,
                period.id,
                json!({ "start_date": start_date, "end_date": end_date }),
            )
            .await
            .map_err(storage_failure(phase))?;
        uow.commit().await.map_err(storage_failure(phase))?;

        info!(
            period_id = %period.id,
            %start_date,
            %end_date,
            correlation_id = %context.correlation_id,
            "Attendance period created"
        );
        Ok(period)
    }

    /// Summarizes take-home pay for every payslip in a period.
    pub async fn period_summary(&self, period_id: Uuid) -> PayrollResult<PeriodSummary> {
        let period = self
            .store
            .find_period(period_id)
            .await
            .map_err(storage_failure(RunPhase::Querying))?
            .ok_or(PayrollError::NotFound { period_id })?;

        let payslips = self
            .store
            .payslips_for_period(period_id)
            .await
            .map_err(storage_failure(RunPhase::Querying))?;

        let mut employees = Vec::with_capacity(payslips.len());
        for payslip in payslips {
            let display_name = self
                .store
                .find_employee(payslip.employee_id)
                .await
                .map_err(storage_failure(RunPhase::Querying))?
                .map(|employee| employee.display_name)
                .unwrap_or_default();
            employees.push(EmployeeTakeHome {
                employee_id: payslip.employee_id,
                display_name,
                take_home_pay: payslip.take_home_pay,
            });
        }
        employees.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then(a.employee_id.cmp(&b.employee_id))
        });

        let total_take_home_pay = checked_total(employees.iter().map(|line| line.take_home_pay))
            .ok_or_else(|| PayrollError::Computation {
                message: format!("total take-home pay of period {} overflowed", period_id),
            })?;

        Ok(PeriodSummary {
            period_id,
            start_date: period.start_date,
            end_date: period.end_date,
            processed_at: period.processed_at,
            employees,
            total_take_home_pay,
        })
    }

    /// Loads an employee's payslip for a period with the reimbursements it paid.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the period does not exist.
    /// - `PayslipNotFound` if the employee has no payslip for it.
    pub async fn employee_payslip(
        &self,
        employee_id: Uuid,
        period_id: Uuid,
    ) -> PayrollResult<PayslipDetail> {
        let period = self
            .store
            .find_period(period_id)
            .await
            .map_err(storage_failure(RunPhase::Querying))?
            .ok_or(PayrollError::NotFound { period_id })?;

        let payslip = self
            .store
            .find_payslip(employee_id, period_id)
            .await
            .map_err(storage_failure(RunPhase::Querying))?
            .ok_or(PayrollError::PayslipNotFound {
                employee_id,
                period_id,
            })?;

        let reimbursements = self
            .store
            .paid_reimbursements(employee_id, period_id)
            .await
            .map_err(storage_failure(RunPhase::Querying))?;

        Ok(PayslipDetail {
            payslip,
            start_date: period.start_date,
            end_date: period.end_date,
            reimbursements,
        })
    }
}
