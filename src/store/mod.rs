//! Storage interfaces consumed by the payroll engine.
//!
//! Each entity gets a narrow store trait exposing only the operations the
//! engine needs. A [`UnitOfWork`] combines them behind a single
//! transaction boundary: writes become visible together on
//! [`UnitOfWork::commit`], and dropping an uncommitted unit of work rolls
//! every buffered write back.
//!
//! [`PayrollStore`] opens units of work and answers the read-only queries
//! used by payslip lookups and summaries. [`InMemoryStore`] is the
//! in-process implementation used by the server binary and the tests.

mod error;
mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{
    AttendancePeriod, AttendanceRecord, AuditEntry, Employee, OvertimeRecord, Payslip,
    ReimbursementRequest,
};

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryStore, MemoryUnitOfWork, SeedData};

/// Attendance period access inside a unit of work.
#[async_trait]
pub trait PeriodStore: Send {
    /// Loads a period and holds it exclusively until the unit of work ends.
    ///
    /// A second unit of work asking for the same period waits until the
    /// first commits or rolls back, and then observes its writes. Looking up
    /// an id with no period leaves no lock behind.
    async fn find_period_for_update(&mut self, id: Uuid) -> StoreResult<Option<AttendancePeriod>>;

    /// Finds an unprocessed period whose range contains `date`, without locking it.
    async fn find_open_period_covering(
        &mut self,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendancePeriod>>;

    /// Inserts a new period.
    async fn insert_period(&mut self, period: &AttendancePeriod) -> StoreResult<()>;

    /// Replaces a stored period with `period`.
    async fn update_period(&mut self, period: &AttendancePeriod) -> StoreResult<()>;
}

/// Employee access inside a unit of work.
#[async_trait]
pub trait EmployeeStore: Send {
    /// Lists every employee.
    async fn list_employees(&mut self) -> StoreResult<Vec<Employee>>;
}

/// Attendance access inside a unit of work.
#[async_trait]
pub trait AttendanceStore: Send {
    /// Lists an employee's attendance with dates in `start..=end`.
    async fn attendance_between(
        &mut self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>>;

    /// Loads an employee's attendance on `date`.
    async fn find_attendance(
        &mut self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>>;

    /// Inserts an attendance record. Fails with [`StoreError::Conflict`] if
    /// the employee already has one for the same date.
    async fn insert_attendance(&mut self, record: &AttendanceRecord) -> StoreResult<()>;
}

/// Overtime access inside a unit of work.
#[async_trait]
pub trait OvertimeStore: Send {
    /// Lists an employee's overtime with dates in `start..=end`.
    async fn overtime_between(
        &mut self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<OvertimeRecord>>;

    /// Inserts an overtime record.
    async fn insert_overtime(&mut self, record: &OvertimeRecord) -> StoreResult<()>;
}

/// Reimbursement access inside a unit of work.
#[async_trait]
pub trait ReimbursementStore: Send {
    /// Lists an employee's approved requests that are unbound or bound to `period_id`.
    async fn eligible_reimbursements(
        &mut self,
        employee_id: Uuid,
        period_id: Uuid,
    ) -> StoreResult<Vec<ReimbursementRequest>>;

    /// Replaces a stored request with `request`.
    async fn update_reimbursement(&mut self, request: &ReimbursementRequest) -> StoreResult<()>;

    /// Inserts a new request.
    async fn insert_reimbursement(&mut self, request: &ReimbursementRequest) -> StoreResult<()>;
}

/// Payslip writes inside a unit of work.
#[async_trait]
pub trait PayslipStore: Send {
    /// Inserts a payslip. Fails with [`StoreError::Conflict`] if one already
    /// exists for the same employee and period.
    async fn insert_payslip(&mut self, payslip: &Payslip) -> StoreResult<()>;
}

/// Append-only audit writes inside a unit of work.
#[async_trait]
pub trait AuditSink: Send {
    /// Appends an audit entry.
    async fn append_audit(&mut self, entry: &AuditEntry) -> StoreResult<()>;
}

/// A transaction spanning every store a payroll operation touches.
///
/// Dropping a unit of work without calling [`commit`](UnitOfWork::commit)
/// discards all of its writes and releases its period locks.
#[async_trait]
pub trait UnitOfWork:
    PeriodStore
    + EmployeeStore
    + AttendanceStore
    + OvertimeStore
    + ReimbursementStore
    + PayslipStore
    + AuditSink
{
    /// Makes every buffered write visible atomically, or none of them.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Entry point to a storage backend.
#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Opens a new unit of work.
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>>;

    /// Loads a period without locking it.
    async fn find_period(&self, id: Uuid) -> StoreResult<Option<AttendancePeriod>>;

    /// Loads an employee.
    async fn find_employee(&self, id: Uuid) -> StoreResult<Option<Employee>>;

    /// Lists the payslips generated for a period.
    async fn payslips_for_period(&self, period_id: Uuid) -> StoreResult<Vec<Payslip>>;

    /// Loads one employee's payslip for a period.
    async fn find_payslip(&self, employee_id: Uuid, period_id: Uuid)
    -> StoreResult<Option<Payslip>>;

    /// Lists an employee's requests paid by the run over `period_id`.
    async fn paid_reimbursements(
        &self,
        employee_id: Uuid,
        period_id: Uuid,
    ) -> StoreResult<Vec<ReimbursementRequest>>;

    /// Lists the audit entries recorded against a target, oldest first.
    async fn audit_entries_for(&self, target_id: Uuid) -> StoreResult<Vec<AuditEntry>>;
}
