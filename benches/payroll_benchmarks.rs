//! Performance benchmarks for the payroll engine.
//!
//! This suite measures:
//! - Working day counting over a month and a year
//! - Aggregating one employee's records into a payslip
//! - A full in-memory payroll run for 10, 100 and 1000 employees
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc, Weekday};
use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use payroll_engine::calculation::{
    AggregationContext, EmployeeRecords, aggregate_employee, count_working_days,
};
use payroll_engine::config::PayrollSettings;
use payroll_engine::models::{
    ActorType, AttendancePeriod, AttendanceRecord, Employee, OvertimeRecord, ReimbursementRequest,
    ReimbursementStatus,
};
use payroll_engine::payroll::{PayrollEngine, RequestContext};
use payroll_engine::store::InMemoryStore;

fn make_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

fn february() -> AttendancePeriod {
    AttendancePeriod::new(make_date("2026-02-01"), make_date("2026-02-28"))
}

fn weekdays(period: &AttendancePeriod) -> Vec<NaiveDate> {
    period
        .start_date
        .iter_days()
        .take_while(|d| *d <= period.end_date)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

/// Builds a full month of records for one employee.
fn employee_records(period: &AttendancePeriod, employee: Employee) -> EmployeeRecords {
    let days = weekdays(period);
    let attendance = days
        .iter()
        .map(|date| AttendanceRecord::new(employee.id, period.id, *date, Utc::now()))
        .collect();
    let overtime = days
        .iter()
        .step_by(3)
        .map(|date| OvertimeRecord::new(employee.id, *date, 2, Decimal::TWO).unwrap())
        .collect();
    let mut claim = ReimbursementRequest::new(employee.id, "travel", Decimal::new(15075, 2)).unwrap();
    claim.status = ReimbursementStatus::Approved;

    EmployeeRecords {
        employee,
        attendance,
        overtime,
        reimbursements: vec![claim],
    }
}

/// Builds a store with `employee_count` fully attending employees.
fn seeded_store(employee_count: usize) -> (InMemoryStore, Uuid) {
    let store = InMemoryStore::new();
    let period = february();
    let period_id = period.id;

    for i in 0..employee_count {
        let employee = Employee::new(format!("employee-{}", i), Decimal::from(60000 + i as i64));
        let records = employee_records(&period, employee.clone());
        store.add_employee(employee).unwrap();
        for record in records.attendance {
            store.add_attendance(record).unwrap();
        }
        for record in records.overtime {
            store.add_overtime(record).unwrap();
        }
        for request in records.reimbursements {
            store.add_reimbursement(request).unwrap();
        }
    }
    store.add_period(period).unwrap();
    (store, period_id)
}

fn bench_working_days(c: &mut Criterion) {
    let mut group = c.benchmark_group("working_days");
    for (name, start, end) in [
        ("month", "2026-02-01", "2026-02-28"),
        ("year", "2026-01-01", "2026-12-31"),
    ] {
        let (start, end) = (make_date(start), make_date(end));
        group.bench_function(name, |b| {
            b.iter(|| count_working_days(black_box(start), black_box(end)))
        });
    }
    group.finish();
}

fn bench_aggregate_employee(c: &mut Criterion) {
    let period = february();
    let records = employee_records(&period, Employee::new("bench", Decimal::from(80000)));
    let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

    c.bench_function("aggregate_employee", |b| {
        b.iter_batched(
            || records.clone(),
            |records| aggregate_employee(black_box(records), &context),
            BatchSize::SmallInput,
        )
    });
}

fn bench_full_run(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let context = RequestContext::new(Uuid::new_v4(), ActorType::Admin, "127.0.0.1");

    let mut group = c.benchmark_group("run_payroll");
    group.sample_size(10);

    for employee_count in [10usize, 100, 1000] {
        group.throughput(Throughput::Elements(employee_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(employee_count),
            &employee_count,
            |b, &employee_count| {
                b.to_async(&rt).iter_batched(
                    || seeded_store(employee_count),
                    |(store, period_id)| {
                        let context = context.clone();
                        async move {
                            let engine =
                                PayrollEngine::new(Arc::new(store), PayrollSettings::default());
                            engine.run_payroll(period_id, &context).await.unwrap()
                        }
                    },
                    BatchSize::LargeInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_working_days,
    bench_aggregate_employee,
    bench_full_run,
);
criterion_main!(benches);
