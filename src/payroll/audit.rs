//! Audit entry construction.
//!
//! The recorder writes through the caller's unit of work, so an entry is
//! stored if and only if the writes it describes commit.

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::models::AuditEntry;
use crate::store::{AuditSink, StoreResult};

use super::context::RequestContext;

/// Action recorded when a payroll run commits payslips.
pub const ACTION_RUN_PAYROLL: &str = "run_payroll";
/// Action recorded when a period with no working days is finalized.
pub const ACTION_RUN_PAYROLL_ZERO_WORKING_DAYS: &str = "run_payroll_zero_working_days";
/// Action recorded when an attendance period is created.
pub const ACTION_CREATE_ATTENDANCE_PERIOD: &str = "create_attendance_period";
/// Action recorded when an employee submits attendance.
pub const ACTION_SUBMIT_ATTENDANCE: &str = "submit_attendance";
/// Action recorded when an employee submits overtime.
pub const ACTION_SUBMIT_OVERTIME: &str = "submit_overtime";
/// Action recorded when an employee submits a reimbursement request.
pub const ACTION_SUBMIT_REIMBURSEMENT: &str = "submit_reimbursement";

/// Target type of every period-level entry.
pub const TARGET_ATTENDANCE_PERIOD: &str = "attendance_period";
/// Target type of attendance submissions.
pub const TARGET_ATTENDANCE_RECORD: &str = "attendance_record";
/// Target type of overtime submissions.
pub const TARGET_OVERTIME_RECORD: &str = "overtime_record";
/// Target type of reimbursement submissions.
pub const TARGET_REIMBURSEMENT_REQUEST: &str = "reimbursement_request";

/// Builds audit entries for one request and appends them to a sink.
#[derive(Debug, Clone, Copy)]
pub struct AuditRecorder<'a> {
    context: &'a RequestContext,
}

impl<'a> AuditRecorder<'a> {
    /// Creates a recorder attributing entries to `context`.
    pub fn new(context: &'a RequestContext) -> Self {
        Self { context }
    }

    /// Builds an entry against any target.
    pub fn entry(
        &self,
        action: &str,
        target_type: &str,
        target_id: Uuid,
        payload: Value,
    ) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id: self.context.actor_id,
            actor_type: self.context.actor_type,
            action: action.to_string(),
            target_type: target_type.to_string(),
            target_id,
            payload,
            ip_address: self.context.source_address.clone(),
            correlation_id: self.context.correlation_id.clone(),
        }
    }

    /// Builds an entry against an attendance period.
    pub fn period_entry(&self, action: &str, period_id: Uuid, payload: Value) -> AuditEntry {
        self.entry(action, TARGET_ATTENDANCE_PERIOD, period_id, payload)
    }

    /// Appends an entry against any target to `sink`.
    pub async fn record<S>(
        &self,
        sink: &mut S,
        action: &str,
        target_type: &str,
        target_id: Uuid,
        payload: Value,
    ) -> StoreResult<()>
    where
        S: AuditSink + ?Sized,
    {
        let entry = self.entry(action, target_type, target_id, payload);
        sink.append_audit(&entry).await
    }

    /// Appends an entry against an attendance period to `sink`.
    pub async fn record_period<S>(
        &self,
        sink: &mut S,
        action: &str,
        period_id: Uuid,
        payload: Value,
    ) -> StoreResult<()>
    where
        S: AuditSink + ?Sized,
    {
        let entry = self.period_entry(action, period_id, payload);
        sink.append_audit(&entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActorType;
    use serde_json::json;

    #[test]
    fn test_entry_targets_submitted_record() {
        let context = RequestContext::new(Uuid::new_v4(), ActorType::Employee, "10.1.2.4");
        let record_id = Uuid::new_v4();

        let entry = AuditRecorder::new(&context).entry(
            ACTION_SUBMIT_OVERTIME,
            TARGET_OVERTIME_RECORD,
            record_id,
            json!({ "hours": 2 }),
        );

        assert_eq!(entry.actor_type, ActorType::Employee);
        assert_eq!(entry.action, "submit_overtime");
        assert_eq!(entry.target_type, "overtime_record");
        assert_eq!(entry.target_id, record_id);
    }

    #[test]
    fn test_period_entry_carries_request_identity() {
        let context = RequestContext::new(Uuid::new_v4(), ActorType::Admin, "10.1.2.3")
            .with_correlation_id("corr-1");
        let period_id = Uuid::new_v4();

        let entry = AuditRecorder::new(&context).period_entry(
            ACTION_RUN_PAYROLL,
            period_id,
            json!({ "payslips_generated": 3 }),
        );

        assert_eq!(entry.actor_id, context.actor_id);
        assert_eq!(entry.actor_type, ActorType::Admin);
        assert_eq!(entry.action, "run_payroll");
        assert_eq!(entry.target_type, "attendance_period");
        assert_eq!(entry.target_id, period_id);
        assert_eq!(entry.ip_address, "10.1.2.3");
        assert_eq!(entry.correlation_id, "corr-1");
        assert_eq!(entry.payload["payslips_generated"], 3);
    }
}
