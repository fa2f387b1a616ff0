//! In-process storage backend.
//!
//! [`InMemoryStore`] keeps every table behind one `RwLock` and gives each
//! existing attendance period its own async mutex. A [`MemoryUnitOfWork`]
//! buffers its writes, holds the mutex of every period it loaded for update,
//! and applies the buffer under a single write lock on commit after
//! re-checking the uniqueness and claim preconditions.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use uuid::Uuid;

use crate::calculation::{DayType, get_day_type};
use crate::models::{
    AttendancePeriod, AttendanceRecord, AuditEntry, Employee, OvertimeRecord, Payslip,
    ReimbursementRequest, ReimbursementStatus,
};

use super::{
    AttendanceStore, AuditSink, EmployeeStore, OvertimeStore, PayrollStore, PayslipStore,
    PeriodStore, ReimbursementStore, StoreError, StoreResult, UnitOfWork,
};

type PeriodLocks = Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<()>>>>;

/// Initial records for an [`InMemoryStore`], usually read from a YAML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    /// Employees on the payroll.
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Attendance periods.
    #[serde(default)]
    pub periods: Vec<AttendancePeriod>,
    /// Attendance records.
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    /// Overtime records.
    #[serde(default)]
    pub overtime: Vec<OvertimeRecord>,
    /// Reimbursement requests.
    #[serde(default)]
    pub reimbursements: Vec<ReimbursementRequest>,
}

#[derive(Debug, Default)]
struct Tables {
    employees: Vec<Employee>,
    periods: HashMap<Uuid, AttendancePeriod>,
    attendance: Vec<AttendanceRecord>,
    overtime: Vec<OvertimeRecord>,
    reimbursements: HashMap<Uuid, ReimbursementRequest>,
    payslips: Vec<Payslip>,
    audit_log: Vec<AuditEntry>,
}

impl Tables {
    fn has_payslip(&self, employee_id: Uuid, period_id: Uuid) -> bool {
        self.payslips
            .iter()
            .any(|p| p.employee_id == employee_id && p.period_id == period_id)
    }

    fn has_attendance(&self, employee_id: Uuid, date: NaiveDate) -> bool {
        self.attendance
            .iter()
            .any(|r| r.employee_id == employee_id && r.date == date)
    }
}

fn duplicate_attendance(record: &AttendanceRecord) -> StoreError {
    StoreError::conflict(
        "attendance_record",
        format!("employee {} already attended on {}", record.employee_id, record.date),
    )
}

fn ensure_weekday(record: &AttendanceRecord) -> StoreResult<()> {
    if get_day_type(record.date) != DayType::Weekday {
        return Err(StoreError::conflict(
            "attendance_record",
            format!("{} is a weekend date", record.date),
        ));
    }
    Ok(())
}

fn poisoned() -> StoreError {
    StoreError::Unavailable {
        message: "in-memory store lock poisoned".to_string(),
    }
}

/// An in-process [`PayrollStore`].
///
/// Cloning is cheap and every clone shares the same tables.
///
/// # Example
///
/// ```
/// use payroll_engine::store::InMemoryStore;
/// use payroll_engine::models::Employee;
/// use rust_decimal::Decimal;
///
/// let store = InMemoryStore::new();
/// store.add_employee(Employee::new("jdoe", Decimal::from(80000))).unwrap();
/// assert_eq!(store.employee_count().unwrap(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    period_locks: Arc<PeriodLocks>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store populated from seed data.
    pub fn from_seed(seed: SeedData) -> StoreResult<Self> {
        let store = Self::new();
        for employee in seed.employees {
            store.add_employee(employee)?;
        }
        for period in seed.periods {
            store.add_period(period)?;
        }
        for record in seed.attendance {
            store.add_attendance(record)?;
        }
        for record in seed.overtime {
            store.add_overtime(record)?;
        }
        for request in seed.reimbursements {
            store.add_reimbursement(request)?;
        }
        Ok(store)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| poisoned())
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| poisoned())
    }

    /// Adds an employee. Fails if the id is taken.
    pub fn add_employee(&self, employee: Employee) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.employees.iter().any(|e| e.id == employee.id) {
            return Err(StoreError::conflict("employee", format!("id {} exists", employee.id)));
        }
        tables.employees.push(employee);
        Ok(())
    }

    /// Adds a period. Fails if the id is taken.
    pub fn add_period(&self, period: AttendancePeriod) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.periods.contains_key(&period.id) {
            return Err(StoreError::conflict("attendance_period", format!("id {} exists", period.id)));
        }
        tables.periods.insert(period.id, period);
        Ok(())
    }

    /// Adds an attendance record. At most one record per employee per date,
    /// and never on a weekend.
    pub fn add_attendance(&self, record: AttendanceRecord) -> StoreResult<()> {
        ensure_weekday(&record)?;
        let mut tables = self.write()?;
        if tables.has_attendance(record.employee_id, record.date) {
            return Err(duplicate_attendance(&record));
        }
        tables.attendance.push(record);
        Ok(())
    }

    /// Adds an overtime record.
    pub fn add_overtime(&self, record: OvertimeRecord) -> StoreResult<()> {
        self.write()?.overtime.push(record);
        Ok(())
    }

    /// Adds a reimbursement request. Fails if the id is taken.
    pub fn add_reimbursement(&self, request: ReimbursementRequest) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.reimbursements.contains_key(&request.id) {
            return Err(StoreError::conflict(
                "reimbursement_request",
                format!("id {} exists", request.id),
            ));
        }
        tables.reimbursements.insert(request.id, request);
        Ok(())
    }

    /// Loads a reimbursement request by id.
    pub fn reimbursement(&self, id: Uuid) -> StoreResult<Option<ReimbursementRequest>> {
        Ok(self.read()?.reimbursements.get(&id).cloned())
    }

    /// Returns the number of employees.
    pub fn employee_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.employees.len())
    }

    /// Returns the number of payslips across all periods.
    pub fn payslip_count(&self) -> StoreResult<usize> {
        Ok(self.read()?.payslips.len())
    }

    /// Returns every audit entry, oldest first.
    pub fn audit_log(&self) -> StoreResult<Vec<AuditEntry>> {
        Ok(self.read()?.audit_log.clone())
    }

    fn period_lock(&self, id: Uuid) -> StoreResult<Arc<tokio::sync::Mutex<()>>> {
        let mut locks = self.period_locks.lock().map_err(|_| poisoned())?;
        Ok(locks.entry(id).or_default().clone())
    }

    /// Drops the map entry for `id` if `lock` is its only outside handle.
    ///
    /// Handles are only cloned under the map mutex, so a count of two (the
    /// map and `lock`) means no other unit of work holds or awaits it.
    fn release_period_lock(&self, id: Uuid, lock: Arc<tokio::sync::Mutex<()>>) -> StoreResult<()> {
        let mut locks = self.period_locks.lock().map_err(|_| poisoned())?;
        let unused = locks
            .get(&id)
            .is_some_and(|entry| Arc::ptr_eq(entry, &lock) && Arc::strong_count(entry) == 2);
        if unused {
            locks.remove(&id);
        }
        Ok(())
    }
}

#[async_trait]
impl PayrollStore for InMemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(MemoryUnitOfWork {
            store: self.clone(),
            held: HashSet::new(),
            guards: Vec::new(),
            pending: PendingWrites::default(),
        }))
    }

    async fn find_period(&self, id: Uuid) -> StoreResult<Option<AttendancePeriod>> {
        Ok(self.read()?.periods.get(&id).cloned())
    }

    async fn find_employee(&self, id: Uuid) -> StoreResult<Option<Employee>> {
        Ok(self.read()?.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn payslips_for_period(&self, period_id: Uuid) -> StoreResult<Vec<Payslip>> {
        Ok(self
            .read()?
            .payslips
            .iter()
            .filter(|p| p.period_id == period_id)
            .cloned()
            .collect())
    }

    async fn find_payslip(
        &self,
        employee_id: Uuid,
        period_id: Uuid,
    ) -> StoreResult<Option<Payslip>> {
        Ok(self
            .read()?
            .payslips
            .iter()
            .find(|p| p.employee_id == employee_id && p.period_id == period_id)
            .cloned())
    }

    async fn paid_reimbursements(
        &self,
        employee_id: Uuid,
        period_id: Uuid,
    ) -> StoreResult<Vec<ReimbursementRequest>> {
        Ok(self
            .read()?
            .reimbursements
            .values()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.period_id == Some(period_id)
                    && r.status == ReimbursementStatus::Paid
            })
            .cloned()
            .collect())
    }

    async fn audit_entries_for(&self, target_id: Uuid) -> StoreResult<Vec<AuditEntry>> {
        Ok(self
            .read()?
            .audit_log
            .iter()
            .filter(|e| e.target_id == target_id)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
struct PendingWrites {
    new_periods: HashMap<Uuid, AttendancePeriod>,
    period_updates: HashMap<Uuid, AttendancePeriod>,
    attendance: Vec<AttendanceRecord>,
    overtime: Vec<OvertimeRecord>,
    new_reimbursements: HashMap<Uuid, ReimbursementRequest>,
    reimbursement_updates: HashMap<Uuid, ReimbursementRequest>,
    payslips: Vec<Payslip>,
    audit: Vec<AuditEntry>,
}

/// A unit of work over an [`InMemoryStore`].
pub struct MemoryUnitOfWork {
    store: InMemoryStore,
    held: HashSet<Uuid>,
    guards: Vec<OwnedMutexGuard<()>>,
    pending: PendingWrites,
}

impl MemoryUnitOfWork {
    fn period_view(&self, id: Uuid) -> StoreResult<Option<AttendancePeriod>> {
        if let Some(period) = self
            .pending
            .period_updates
            .get(&id)
            .or_else(|| self.pending.new_periods.get(&id))
        {
            return Ok(Some(period.clone()));
        }
        Ok(self.store.read()?.periods.get(&id).cloned())
    }
}

#[async_trait]
impl PeriodStore for MemoryUnitOfWork {
    async fn find_period_for_update(&mut self, id: Uuid) -> StoreResult<Option<AttendancePeriod>> {
        if self.held.contains(&id) {
            return self.period_view(id);
        }

        let lock = self.store.period_lock(id)?;
        let guard = Arc::clone(&lock).lock_owned().await;
        let Some(period) = self.period_view(id)? else {
            drop(guard);
            self.store.release_period_lock(id, lock)?;
            return Ok(None);
        };

        self.guards.push(guard);
        self.held.insert(id);
        debug!(period_id = %id, "Period locked for update");
        Ok(Some(period))
    }

    async fn find_open_period_covering(
        &mut self,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendancePeriod>> {
        let tables = self.store.read()?;
        let open = tables
            .periods
            .values()
            .chain(self.pending.new_periods.values())
            .map(|p| self.pending.period_updates.get(&p.id).unwrap_or(p))
            .filter(|p| !p.is_processed() && p.contains_date(date))
            .min_by_key(|p| (p.start_date, p.id))
            .cloned();
        Ok(open)
    }

    async fn insert_period(&mut self, period: &AttendancePeriod) -> StoreResult<()> {
        let exists = self.pending.new_periods.contains_key(&period.id)
            || self.store.read()?.periods.contains_key(&period.id);
        if exists {
            return Err(StoreError::conflict(
                "attendance_period",
                format!("id {} exists", period.id),
            ));
        }
        self.pending.new_periods.insert(period.id, period.clone());
        Ok(())
    }

    async fn update_period(&mut self, period: &AttendancePeriod) -> StoreResult<()> {
        if let Some(new_period) = self.pending.new_periods.get_mut(&period.id) {
            *new_period = period.clone();
            return Ok(());
        }
        if !self.store.read()?.periods.contains_key(&period.id) {
            return Err(StoreError::missing("attendance_period", period.id));
        }
        self.pending.period_updates.insert(period.id, period.clone());
        Ok(())
    }
}

#[async_trait]
impl EmployeeStore for MemoryUnitOfWork {
    async fn list_employees(&mut self) -> StoreResult<Vec<Employee>> {
        Ok(self.store.read()?.employees.clone())
    }
}

#[async_trait]
impl AttendanceStore for MemoryUnitOfWork {
    async fn attendance_between(
        &mut self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        Ok(self
            .store
            .read()?
            .attendance
            .iter()
            .filter(|r| r.employee_id == employee_id && r.date >= start && r.date <= end)
            .cloned()
            .collect())
    }

    async fn find_attendance(
        &mut self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let tables = self.store.read()?;
        let found = tables
            .attendance
            .iter()
            .chain(self.pending.attendance.iter())
            .find(|r| r.employee_id == employee_id && r.date == date)
            .cloned();
        Ok(found)
    }

    async fn insert_attendance(&mut self, record: &AttendanceRecord) -> StoreResult<()> {
        ensure_weekday(record)?;
        let duplicate = self
            .pending
            .attendance
            .iter()
            .any(|r| r.employee_id == record.employee_id && r.date == record.date)
            || self
                .store
                .read()?
                .has_attendance(record.employee_id, record.date);
        if duplicate {
            return Err(duplicate_attendance(record));
        }
        self.pending.attendance.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl OvertimeStore for MemoryUnitOfWork {
    async fn overtime_between(
        &mut self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<OvertimeRecord>> {
        Ok(self
            .store
            .read()?
            .overtime
            .iter()
            .filter(|r| r.employee_id == employee_id && r.date >= start && r.date <= end)
            .cloned()
            .collect())
    }

    async fn insert_overtime(&mut self, record: &OvertimeRecord) -> StoreResult<()> {
        self.pending.overtime.push(record.clone());
        Ok(())
    }
}

#[async_trait]
impl ReimbursementStore for MemoryUnitOfWork {
    async fn eligible_reimbursements(
        &mut self,
        employee_id: Uuid,
        period_id: Uuid,
    ) -> StoreResult<Vec<ReimbursementRequest>> {
        let tables = self.store.read()?;
        let eligible = tables
            .reimbursements
            .values()
            .map(|r| self.pending.reimbursement_updates.get(&r.id).unwrap_or(r))
            .filter(|r| r.employee_id == employee_id && r.is_eligible_for(period_id))
            .cloned()
            .collect();
        Ok(eligible)
    }

    async fn update_reimbursement(&mut self, request: &ReimbursementRequest) -> StoreResult<()> {
        if !self.store.read()?.reimbursements.contains_key(&request.id) {
            return Err(StoreError::missing("reimbursement_request", request.id));
        }
        self.pending
            .reimbursement_updates
            .insert(request.id, request.clone());
        Ok(())
    }

    async fn insert_reimbursement(&mut self, request: &ReimbursementRequest) -> StoreResult<()> {
        let exists = self.pending.new_reimbursements.contains_key(&request.id)
            || self.store.read()?.reimbursements.contains_key(&request.id);
        if exists {
            return Err(StoreError::conflict(
                "reimbursement_request",
                format!("id {} exists", request.id),
            ));
        }
        self.pending
            .new_reimbursements
            .insert(request.id, request.clone());
        Ok(())
    }
}

#[async_trait]
impl PayslipStore for MemoryUnitOfWork {
    async fn insert_payslip(&mut self, payslip: &Payslip) -> StoreResult<()> {
        let duplicate = self
            .pending
            .payslips
            .iter()
            .any(|p| p.employee_id == payslip.employee_id && p.period_id == payslip.period_id)
            || self
                .store
                .read()?
                .has_payslip(payslip.employee_id, payslip.period_id);
        if duplicate {
            return Err(StoreError::conflict(
                "payslip",
                format!(
                    "employee {} already has a payslip for period {}",
                    payslip.employee_id, payslip.period_id
                ),
            ));
        }
        self.pending.payslips.push(payslip.clone());
        Ok(())
    }
}

#[async_trait]
impl AuditSink for MemoryUnitOfWork {
    async fn append_audit(&mut self, entry: &AuditEntry) -> StoreResult<()> {
        self.pending.audit.push(entry.clone());
        Ok(())
    }
}

/// Checks that every buffered write still applies to the committed tables.
fn validate(tables: &Tables, pending: &PendingWrites) -> StoreResult<()> {
    for id in pending.new_periods.keys() {
        if tables.periods.contains_key(id) {
            return Err(StoreError::conflict("attendance_period", format!("id {} exists", id)));
        }
    }

    for (id, update) in &pending.period_updates {
        let current = tables
            .periods
            .get(id)
            .ok_or_else(|| StoreError::missing("attendance_period", id))?;
        // processed_at moves from unset to set once, never back.
        if current.processed_at.is_some() && current.processed_at != update.processed_at {
            return Err(StoreError::conflict(
                "attendance_period",
                format!("period {} was already processed", id),
            ));
        }
    }

    for record in &pending.attendance {
        if tables.has_attendance(record.employee_id, record.date) {
            return Err(duplicate_attendance(record));
        }
        if tables.periods.get(&record.period_id).is_some_and(|p| p.is_processed()) {
            return Err(StoreError::conflict(
                "attendance_record",
                format!("period {} was already processed", record.period_id),
            ));
        }
    }

    for id in pending.new_reimbursements.keys() {
        if tables.reimbursements.contains_key(id) {
            return Err(StoreError::conflict(
                "reimbursement_request",
                format!("id {} exists", id),
            ));
        }
    }

    for (id, update) in &pending.reimbursement_updates {
        let current = tables
            .reimbursements
            .get(id)
            .ok_or_else(|| StoreError::missing("reimbursement_request", id))?;
        if update.status == ReimbursementStatus::Paid {
            let claimable = update
                .period_id
                .is_some_and(|period_id| current.is_eligible_for(period_id));
            if !claimable {
                return Err(StoreError::conflict(
                    "reimbursement_request",
                    format!("request {} is no longer claimable", id),
                ));
            }
        }
    }

    for payslip in &pending.payslips {
        if tables.has_payslip(payslip.employee_id, payslip.period_id) {
            return Err(StoreError::conflict(
                "payslip",
                format!(
                    "employee {} already has a payslip for period {}",
                    payslip.employee_id, payslip.period_id
                ),
            ));
        }
    }

    Ok(())
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryUnitOfWork {
            store,
            guards,
            pending,
            ..
        } = *self;

        {
            let mut tables = store.write()?;
            validate(&tables, &pending)?;

            tables.periods.extend(pending.new_periods);
            tables.periods.extend(pending.period_updates);
            tables.attendance.extend(pending.attendance);
            tables.overtime.extend(pending.overtime);
            tables.reimbursements.extend(pending.new_reimbursements);
            tables.reimbursements.extend(pending.reimbursement_updates);
            tables.payslips.extend(pending.payslips);
            tables.audit_log.extend(pending.audit);
        }

        // Period locks are released only after the writes are visible.
        drop(guards);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActorType, OvertimeRecord, ReimbursementStatus};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::time::Duration;

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    fn february() -> AttendancePeriod {
        AttendancePeriod::new(make_date("2026-02-01"), make_date("2026-02-28"))
    }

    fn payslip_for(employee_id: Uuid, period_id: Uuid) -> Payslip {
        Payslip {
            id: Uuid::new_v4(),
            employee_id,
            period_id,
            base_salary: Decimal::from(100),
            prorated_salary: Decimal::from(100),
            attendance_count: 1,
            total_working_days: 1,
            overtime_hours: Decimal::ZERO,
            overtime_pay: Decimal::ZERO,
            reimbursements_total: Decimal::ZERO,
            take_home_pay: Decimal::from(100),
            created_by: None,
            ip_address: None,
        }
    }

    fn audit_entry(target_id: Uuid) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id: Uuid::new_v4(),
            actor_type: ActorType::Admin,
            action: "run_payroll".to_string(),
            target_type: "attendance_period".to_string(),
            target_id,
            payload: serde_json::json!({}),
            ip_address: "127.0.0.1".to_string(),
            correlation_id: "req-1".to_string(),
        }
    }

    #[test]
    fn test_duplicate_attendance_same_day_is_rejected() {
        let store = InMemoryStore::new();
        let period = february();
        let employee = Uuid::new_v4();
        let date = make_date("2026-02-03");
        store
            .add_attendance(AttendanceRecord::new(employee, period.id, date, Utc::now()))
            .unwrap();

        let result = store.add_attendance(AttendanceRecord::new(employee, period.id, date, Utc::now()));

        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_uncommitted_writes_are_discarded_on_drop() {
        let store = InMemoryStore::new();
        let period = february();
        store.add_period(period.clone()).unwrap();

        {
            let mut uow = store.begin().await.unwrap();
            let mut locked = uow.find_period_for_update(period.id).await.unwrap().unwrap();
            locked.mark_processed(Utc::now(), Uuid::new_v4(), "127.0.0.1");
            uow.update_period(&locked).await.unwrap();
            uow.insert_payslip(&payslip_for(Uuid::new_v4(), period.id))
                .await
                .unwrap();
            uow.append_audit(&audit_entry(period.id)).await.unwrap();
        }

        let stored = store.find_period(period.id).await.unwrap().unwrap();
        assert!(!stored.is_processed());
        assert_eq!(store.payslip_count().unwrap(), 0);
        assert!(store.audit_log().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_applies_all_writes() {
        let store = InMemoryStore::new();
        let period = february();
        store.add_period(period.clone()).unwrap();

        let mut uow = store.begin().await.unwrap();
        let mut locked = uow.find_period_for_update(period.id).await.unwrap().unwrap();
        locked.mark_processed(Utc::now(), Uuid::new_v4(), "127.0.0.1");
        uow.update_period(&locked).await.unwrap();
        uow.insert_payslip(&payslip_for(Uuid::new_v4(), period.id))
            .await
            .unwrap();
        uow.append_audit(&audit_entry(period.id)).await.unwrap();
        uow.commit().await.unwrap();

        assert!(store.find_period(period.id).await.unwrap().unwrap().is_processed());
        assert_eq!(store.payslips_for_period(period.id).await.unwrap().len(), 1);
        assert_eq!(store.audit_entries_for(period.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_payslip_insert_conflicts() {
        let store = InMemoryStore::new();
        let period = february();
        let employee = Uuid::new_v4();

        let mut uow = store.begin().await.unwrap();
        uow.insert_payslip(&payslip_for(employee, period.id)).await.unwrap();
        let second = uow.insert_payslip(&payslip_for(employee, period.id)).await;

        assert!(matches!(second, Err(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_period_lock_blocks_second_unit_of_work() {
        let store = InMemoryStore::new();
        let period = february();
        store.add_period(period.clone()).unwrap();

        let mut first = store.begin().await.unwrap();
        first.find_period_for_update(period.id).await.unwrap();

        let contender = store.clone();
        let period_id = period.id;
        let waiter = tokio::spawn(async move {
            let mut second = contender.begin().await.unwrap();
            second.find_period_for_update(period_id).await.unwrap()
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        let mut locked = first.find_period_for_update(period.id).await.unwrap().unwrap();
        locked.mark_processed(Utc::now(), Uuid::new_v4(), "127.0.0.1");
        first.update_period(&locked).await.unwrap();
        first.commit().await.unwrap();

        let observed = waiter.await.unwrap().unwrap();
        assert!(observed.is_processed());
    }

    #[tokio::test]
    async fn test_claimed_reimbursement_cannot_be_claimed_twice() {
        let store = InMemoryStore::new();
        let employee = Uuid::new_v4();
        let mut request = ReimbursementRequest::new(employee, "taxi", Decimal::from(150)).unwrap();
        request.status = ReimbursementStatus::Approved;
        store.add_reimbursement(request.clone()).unwrap();

        let period_a = Uuid::new_v4();
        let period_b = Uuid::new_v4();

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        let mut claim_a = first.eligible_reimbursements(employee, period_a).await.unwrap().remove(0);
        let mut claim_b = second.eligible_reimbursements(employee, period_b).await.unwrap().remove(0);
        claim_a.mark_paid(period_a, Uuid::new_v4(), "127.0.0.1");
        claim_b.mark_paid(period_b, Uuid::new_v4(), "127.0.0.1");
        first.update_reimbursement(&claim_a).await.unwrap();
        second.update_reimbursement(&claim_b).await.unwrap();

        first.commit().await.unwrap();
        let result = second.commit().await;

        assert!(matches!(result, Err(StoreError::Conflict { .. })));
        let stored = store.reimbursement(request.id).unwrap().unwrap();
        assert_eq!(stored.period_id, Some(period_a));
    }

    #[tokio::test]
    async fn test_eligible_reimbursements_filters_status_and_period() {
        let store = InMemoryStore::new();
        let employee = Uuid::new_v4();
        let period = Uuid::new_v4();

        let mut unbound = ReimbursementRequest::new(employee, "a", Decimal::from(1)).unwrap();
        unbound.status = ReimbursementStatus::Approved;
        let mut bound_here = ReimbursementRequest::new(employee, "b", Decimal::from(2)).unwrap();
        bound_here.status = ReimbursementStatus::Approved;
        bound_here.period_id = Some(period);
        let mut bound_elsewhere = ReimbursementRequest::new(employee, "c", Decimal::from(3)).unwrap();
        bound_elsewhere.status = ReimbursementStatus::Approved;
        bound_elsewhere.period_id = Some(Uuid::new_v4());
        let pending = ReimbursementRequest::new(employee, "d", Decimal::from(4)).unwrap();
        for request in [unbound, bound_here, bound_elsewhere, pending] {
            store.add_reimbursement(request).unwrap();
        }

        let mut uow = store.begin().await.unwrap();
        let eligible = uow.eligible_reimbursements(employee, period).await.unwrap();

        let mut amounts: Vec<Decimal> = eligible.iter().map(|r| r.amount).collect();
        amounts.sort();
        assert_eq!(amounts, vec![Decimal::from(1), Decimal::from(2)]);
    }

    #[tokio::test]
    async fn test_unknown_period_lookups_leave_no_locks() {
        let store = InMemoryStore::new();
        let period = february();
        store.add_period(period.clone()).unwrap();

        for _ in 0..1_000 {
            let mut uow = store.begin().await.unwrap();
            assert!(uow.find_period_for_update(Uuid::new_v4()).await.unwrap().is_none());
        }
        assert!(store.period_locks.lock().unwrap().is_empty());

        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_period_for_update(period.id).await.unwrap().is_some());
        assert_eq!(store.period_locks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lock_kept_while_another_unit_of_work_waits() {
        let store = InMemoryStore::new();
        let missing = Uuid::new_v4();
        let lock = store.period_lock(missing).unwrap();
        let held = Arc::clone(&lock).lock_owned().await;

        let contender = store.clone();
        let waiter = tokio::spawn(async move {
            let mut uow = contender.begin().await.unwrap();
            uow.find_period_for_update(missing).await.unwrap()
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The waiter still owns a handle, so the entry must survive this release.
        drop(held);
        assert!(waiter.await.unwrap().is_none());
        store.release_period_lock(missing, lock).unwrap();
        assert!(store.period_locks.lock().unwrap().is_empty());
    }

    #[test]
    fn test_weekend_attendance_is_rejected() {
        let store = InMemoryStore::new();
        let saturday = make_date("2026-02-07");
        let result = store.add_attendance(AttendanceRecord::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            saturday,
            Utc::now(),
        ));
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_submitted_records_commit_together() {
        let store = InMemoryStore::new();
        let period = february();
        store.add_period(period.clone()).unwrap();
        let employee = Uuid::new_v4();
        let date = make_date("2026-02-03");

        let mut uow = store.begin().await.unwrap();
        let open = uow.find_open_period_covering(date).await.unwrap().unwrap();
        assert_eq!(open.id, period.id);

        let attendance = AttendanceRecord::new(employee, period.id, date, Utc::now());
        uow.insert_attendance(&attendance).await.unwrap();
        let again = uow
            .insert_attendance(&AttendanceRecord::new(employee, period.id, date, Utc::now()))
            .await;
        assert!(matches!(again, Err(StoreError::Conflict { .. })));
        assert!(uow.find_attendance(employee, date).await.unwrap().is_some());

        uow.insert_overtime(&OvertimeRecord::new(employee, date, 2, Decimal::TWO).unwrap())
            .await
            .unwrap();
        let request = ReimbursementRequest::new(employee, "parking", Decimal::from(12)).unwrap();
        uow.insert_reimbursement(&request).await.unwrap();
        uow.commit().await.unwrap();

        let mut reader = store.begin().await.unwrap();
        assert_eq!(reader.attendance_between(employee, date, date).await.unwrap().len(), 1);
        assert_eq!(reader.overtime_between(employee, date, date).await.unwrap().len(), 1);
        assert!(store.reimbursement(request.id).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_processed_period_is_not_open() {
        let store = InMemoryStore::new();
        let mut period = february();
        period.mark_processed(Utc::now(), Uuid::new_v4(), "127.0.0.1");
        store.add_period(period).unwrap();

        let mut uow = store.begin().await.unwrap();
        let open = uow
            .find_open_period_covering(make_date("2026-02-03"))
            .await
            .unwrap();
        assert!(open.is_none());
    }

    #[tokio::test]
    async fn test_attendance_committed_twice_conflicts() {
        let store = InMemoryStore::new();
        let employee = Uuid::new_v4();
        let date = make_date("2026-02-04");

        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();
        first
            .insert_attendance(&AttendanceRecord::new(employee, Uuid::new_v4(), date, Utc::now()))
            .await
            .unwrap();
        second
            .insert_attendance(&AttendanceRecord::new(employee, Uuid::new_v4(), date, Utc::now()))
            .await
            .unwrap();

        first.commit().await.unwrap();
        assert!(matches!(second.commit().await, Err(StoreError::Conflict { .. })));
    }

    #[test]
    fn test_from_seed_yaml() {
        let yaml = r#"
employees:
  - id: 6f1d2a8e-6f5c-4a77-9d0c-2b0f1f0c7a11
    display_name: jdoe
    salary: "80000.00"
periods:
  - id: 0b4c8a52-3b1e-4a0e-9a55-7d1d4f2a9e01
    start_date: 2026-02-01
    end_date: 2026-02-28
"#;
        let seed: SeedData = serde_yaml::from_str(yaml).unwrap();
        let store = InMemoryStore::from_seed(seed).unwrap();
        assert_eq!(store.employee_count().unwrap(), 1);
    }
}
