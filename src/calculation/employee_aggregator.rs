//! Per-employee payslip aggregation.
//!
//! This module turns one employee's attendance, overtime and eligible
//! reimbursement records for a period into a [`Payslip`]. It performs no
//! storage access: the orchestrator fetches the records and persists the
//! result, which keeps the arithmetic testable on its own.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};
use crate::models::{
    AttendancePeriod, AttendanceRecord, Employee, OvertimeRecord, Payslip, ReimbursementRequest,
};

use super::money::{round_money, DEFAULT_CURRENCY_SCALE};

/// Working hours in a day, used to derive the hourly rate from the daily rate.
pub const DEFAULT_HOURS_PER_DAY: u32 = 8;

/// Run-wide values shared by every employee's aggregation.
#[derive(Debug, Clone)]
pub struct AggregationContext<'a> {
    /// The period being paid.
    pub period: &'a AttendancePeriod,
    /// Working days in the period.
    pub total_working_days: u32,
    /// Hours in a working day. Must be non-zero.
    pub hours_per_day: u32,
    /// Decimal places monetary outputs are rounded to.
    pub currency_scale: u32,
    /// The actor running payroll.
    pub actor_id: Uuid,
    /// Origin address of the run.
    pub ip_address: &'a str,
}

impl<'a> AggregationContext<'a> {
    /// Creates a context with the default hours per day and currency scale.
    pub fn new(
        period: &'a AttendancePeriod,
        total_working_days: u32,
        actor_id: Uuid,
        ip_address: &'a str,
    ) -> Self {
        Self {
            period,
            total_working_days,
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            currency_scale: DEFAULT_CURRENCY_SCALE,
            actor_id,
            ip_address,
        }
    }
}

/// The raw records gathered for one employee.
#[derive(Debug, Clone)]
pub struct EmployeeRecords {
    /// The employee being paid.
    pub employee: Employee,
    /// Attendance records within the period.
    pub attendance: Vec<AttendanceRecord>,
    /// Overtime records within the period.
    pub overtime: Vec<OvertimeRecord>,
    /// Reimbursement requests eligible for the period.
    pub reimbursements: Vec<ReimbursementRequest>,
}

/// The outcome of aggregating one employee.
#[derive(Debug, Clone)]
pub struct EmployeeAggregation {
    /// The payslip to insert.
    pub payslip: Payslip,
    /// Reimbursement requests now bound to the period and marked paid.
    pub paid_reimbursements: Vec<ReimbursementRequest>,
}

/// Computes an employee's payslip for the period.
///
/// # Computation
///
/// - `attendance_count`: distinct attended dates inside the period.
/// - `prorated_salary`: `salary / W * attendance_count`, or 0 when `W` is 0.
/// - `overtime_pay`: for each overtime record, `salary / W / hours_per_day *
///   hours * rate_multiplier`. Overtime is ignored when `W` is 0.
/// - `reimbursements_total`: sum of every eligible request, each of which is
///   bound to the period and marked paid.
/// - `take_home_pay`: the sum of the three rounded components.
///
/// Intermediate values keep full decimal precision; each component is
/// rounded once, at the end, to `currency_scale`.
///
/// # Errors
///
/// `Computation` if any intermediate value leaves the decimal range.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{aggregate_employee, AggregationContext, EmployeeRecords};
/// use payroll_engine::models::{AttendancePeriod, Employee, OvertimeRecord};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let period = AttendancePeriod::new(
///     NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 2, 28).unwrap(),
/// );
/// let employee = Employee::new("jdoe", Decimal::from(80000));
/// let overtime = OvertimeRecord::new(
///     employee.id,
///     NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
///     2,
///     Decimal::TWO,
/// ).unwrap();
///
/// let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");
/// let records = EmployeeRecords {
///     employee,
///     attendance: vec![],
///     overtime: vec![overtime],
///     reimbursements: vec![],
/// };
///
/// let result = aggregate_employee(records, &context).unwrap();
/// assert_eq!(result.payslip.overtime_pay, Decimal::from(2000));
/// assert_eq!(result.payslip.prorated_salary, Decimal::ZERO);
/// ```
pub fn aggregate_employee(
    records: EmployeeRecords,
    context: &AggregationContext<'_>,
) -> PayrollResult<EmployeeAggregation> {
    let EmployeeRecords {
        employee,
        attendance,
        overtime,
        reimbursements,
    } = records;
    let period = context.period;
    let working_days = context.total_working_days;
    let overflow = |component: &str| PayrollError::Computation {
        message: format!("{} overflowed for employee {}", component, employee.id),
    };

    let attendance_count = attendance
        .iter()
        .filter(|record| record.employee_id == employee.id && period.contains_date(record.date))
        .map(|record| record.date)
        .collect::<BTreeSet<_>>()
        .len() as u32;

    let mut prorated_salary = Decimal::ZERO;
    let mut overtime_hours = Decimal::ZERO;
    let mut overtime_pay = Decimal::ZERO;

    // Nothing is payable per day without working days; overtime is dropped too.
    if working_days > 0 && context.hours_per_day > 0 {
        let daily_rate = employee
            .salary
            .checked_div(Decimal::from(working_days))
            .ok_or_else(|| overflow("daily rate"))?;
        let hourly_rate = daily_rate
            .checked_div(Decimal::from(context.hours_per_day))
            .ok_or_else(|| overflow("hourly rate"))?;

        prorated_salary = daily_rate
            .checked_mul(Decimal::from(attendance_count))
            .ok_or_else(|| overflow("prorated salary"))?;

        for record in overtime
            .iter()
            .filter(|r| r.employee_id == employee.id && period.contains_date(r.date))
        {
            let hours = record.hours.as_decimal();
            overtime_pay = hourly_rate
                .checked_mul(hours)
                .and_then(|pay| pay.checked_mul(record.rate_multiplier))
                .and_then(|pay| overtime_pay.checked_add(pay))
                .ok_or_else(|| overflow("overtime pay"))?;
            overtime_hours += hours;
        }
    }

    let mut reimbursements_total = Decimal::ZERO;
    let mut paid_reimbursements = Vec::new();
    for mut request in reimbursements {
        if request.employee_id != employee.id || !request.is_eligible_for(period.id) {
            continue;
        }
        reimbursements_total = reimbursements_total
            .checked_add(request.amount)
            .ok_or_else(|| overflow("reimbursements total"))?;
        request.mark_paid(period.id, context.actor_id, context.ip_address);
        paid_reimbursements.push(request);
    }

    let prorated_salary = round_money(prorated_salary, context.currency_scale);
    let overtime_pay = round_money(overtime_pay, context.currency_scale);
    let reimbursements_total = round_money(reimbursements_total, context.currency_scale);
    let take_home_pay = prorated_salary
        .checked_add(overtime_pay)
        .and_then(|sum| sum.checked_add(reimbursements_total))
        .ok_or_else(|| overflow("take-home pay"))?;

    let payslip = Payslip {
        id: Uuid::new_v4(),
        employee_id: employee.id,
        period_id: period.id,
        base_salary: employee.salary,
        prorated_salary,
        attendance_count,
        total_working_days: working_days,
        overtime_hours,
        overtime_pay,
        reimbursements_total,
        take_home_pay,
        created_by: Some(context.actor_id),
        ip_address: Some(context.ip_address.to_string()),
    };

    Ok(EmployeeAggregation {
        payslip,
        paid_reimbursements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReimbursementStatus;
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn make_date(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
    }

    /// February 2026: 20 working days.
    fn february() -> AttendancePeriod {
        AttendancePeriod::new(make_date("2026-02-01"), make_date("2026-02-28"))
    }

    fn attend(employee: &Employee, period: &AttendancePeriod, date: &str) -> AttendanceRecord {
        AttendanceRecord::new(employee.id, period.id, make_date(date), Utc::now())
    }

    fn weekdays_of_february() -> Vec<String> {
        make_date("2026-02-01")
            .iter_days()
            .take_while(|d| *d <= make_date("2026-02-28"))
            .filter(|d| crate::calculation::get_day_type(*d) == crate::calculation::DayType::Weekday)
            .map(|d| d.to_string())
            .collect()
    }

    fn approved(employee: &Employee, amount: &str, period_id: Option<Uuid>) -> ReimbursementRequest {
        let mut request = ReimbursementRequest::new(employee.id, "travel", dec(amount)).unwrap();
        request.status = ReimbursementStatus::Approved;
        request.period_id = period_id;
        request
    }

    fn records(employee: Employee) -> EmployeeRecords {
        EmployeeRecords {
            employee,
            attendance: vec![],
            overtime: vec![],
            reimbursements: vec![],
        }
    }

    #[test]
    fn test_full_attendance_pays_full_salary() {
        let period = february();
        let employee = Employee::new("jdoe", dec("80000"));
        let mut input = records(employee.clone());
        input.attendance = weekdays_of_february()
            .iter()
            .map(|d| attend(&employee, &period, d))
            .collect();
        let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(input, &context).unwrap();

        assert_eq!(result.payslip.attendance_count, 20);
        assert_eq!(result.payslip.prorated_salary, dec("80000"));
        assert_eq!(result.payslip.take_home_pay, dec("80000"));
        assert_eq!(result.payslip.base_salary, dec("80000"));
        assert_eq!(result.payslip.total_working_days, 20);
    }

    #[test]
    fn test_overtime_two_hours_at_double_rate() {
        let period = february();
        let employee = Employee::new("jdoe", dec("80000"));
        let mut input = records(employee.clone());
        input.overtime = vec![
            OvertimeRecord::new(employee.id, make_date("2026-02-03"), 2, dec("2.0")).unwrap(),
        ];
        let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(input, &context).unwrap();

        // daily 4000, hourly 500, 500 * 2 * 2
        assert_eq!(result.payslip.overtime_pay, dec("2000"));
        assert_eq!(result.payslip.overtime_hours, dec("2"));
    }

    #[test]
    fn test_zero_attendance_prorates_to_zero() {
        let period = february();
        let employee = Employee::new("jdoe", dec("123456.78"));
        let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(records(employee), &context).unwrap();

        assert_eq!(result.payslip.attendance_count, 0);
        assert_eq!(result.payslip.prorated_salary, Decimal::ZERO);
        assert_eq!(result.payslip.take_home_pay, Decimal::ZERO);
    }

    #[test]
    fn test_duplicate_attendance_dates_count_once() {
        let period = february();
        let employee = Employee::new("jdoe", dec("80000"));
        let mut input = records(employee.clone());
        input.attendance = vec![
            attend(&employee, &period, "2026-02-03"),
            attend(&employee, &period, "2026-02-03"),
            attend(&employee, &period, "2026-02-04"),
        ];
        let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(input, &context).unwrap();

        assert_eq!(result.payslip.attendance_count, 2);
        assert_eq!(result.payslip.prorated_salary, dec("8000"));
    }

    #[test]
    fn test_records_outside_period_are_ignored() {
        let period = february();
        let employee = Employee::new("jdoe", dec("80000"));
        let mut input = records(employee.clone());
        input.attendance = vec![attend(&employee, &period, "2026-03-02")];
        input.overtime = vec![
            OvertimeRecord::new(employee.id, make_date("2026-01-30"), 3, dec("2")).unwrap(),
        ];
        let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(input, &context).unwrap();

        assert_eq!(result.payslip.attendance_count, 0);
        assert_eq!(result.payslip.overtime_pay, Decimal::ZERO);
    }

    #[test]
    fn test_zero_working_days_ignores_overtime() {
        let period = AttendancePeriod::new(make_date("2026-01-17"), make_date("2026-01-18"));
        let employee = Employee::new("jdoe", dec("80000"));
        let mut input = records(employee.clone());
        input.overtime = vec![
            OvertimeRecord::new(employee.id, make_date("2026-01-17"), 3, dec("2")).unwrap(),
        ];
        let context = AggregationContext::new(&period, 0, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(input, &context).unwrap();

        assert_eq!(result.payslip.overtime_pay, Decimal::ZERO);
        assert_eq!(result.payslip.overtime_hours, Decimal::ZERO);
        assert_eq!(result.payslip.prorated_salary, Decimal::ZERO);
    }

    #[test]
    fn test_eligible_reimbursements_are_claimed() {
        let period = february();
        let employee = Employee::new("jdoe", dec("80000"));
        let actor = Uuid::new_v4();
        let mut input = records(employee.clone());
        input.reimbursements = vec![
            approved(&employee, "150", None),
            approved(&employee, "49.99", Some(period.id)),
        ];
        let context = AggregationContext::new(&period, 20, actor, "10.1.1.1");

        let result = aggregate_employee(input, &context).unwrap();

        assert_eq!(result.payslip.reimbursements_total, dec("199.99"));
        assert_eq!(result.paid_reimbursements.len(), 2);
        for request in &result.paid_reimbursements {
            assert_eq!(request.status, ReimbursementStatus::Paid);
            assert_eq!(request.period_id, Some(period.id));
            assert_eq!(request.updated_by, Some(actor));
        }
    }

    #[test]
    fn test_ineligible_reimbursements_are_untouched() {
        let period = february();
        let employee = Employee::new("jdoe", dec("80000"));
        let mut pending = approved(&employee, "10", None);
        pending.status = ReimbursementStatus::Pending;
        let mut input = records(employee.clone());
        input.reimbursements = vec![pending, approved(&employee, "20", Some(Uuid::new_v4()))];
        let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(input, &context).unwrap();

        assert_eq!(result.payslip.reimbursements_total, Decimal::ZERO);
        assert!(result.paid_reimbursements.is_empty());
    }

    #[test]
    fn test_non_terminating_division_rounds_once() {
        // W = 21: 100000 / 21 = 4761.904761...
        let period = AttendancePeriod::new(make_date("2026-01-01"), make_date("2026-01-31"));
        let employee = Employee::new("jdoe", dec("100000"));
        let mut input = records(employee.clone());
        input.attendance = ["2026-01-05", "2026-01-06", "2026-01-07"]
            .iter()
            .map(|d| attend(&employee, &period, d))
            .collect();
        let context = AggregationContext::new(&period, 21, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(input, &context).unwrap();

        assert_eq!(result.payslip.prorated_salary, dec("14285.71"));
        assert!(result.payslip.is_balanced());
    }

    #[test]
    fn test_custom_hours_per_day() {
        let period = february();
        let employee = Employee::new("jdoe", dec("80000"));
        let mut input = records(employee.clone());
        input.overtime = vec![
            OvertimeRecord::new(employee.id, make_date("2026-02-03"), 1, dec("1.5")).unwrap(),
        ];
        let mut context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");
        context.hours_per_day = 10;

        let result = aggregate_employee(input, &context).unwrap();

        // daily 4000, hourly 400, 400 * 1 * 1.5
        assert_eq!(result.payslip.overtime_pay, dec("600"));
    }

    #[test]
    fn test_reimbursement_overflow_is_an_error() {
        let period = february();
        let employee = Employee::new("jdoe", dec("80000"));
        let mut input = records(employee.clone());
        let mut first = approved(&employee, "1", None);
        first.amount = Decimal::MAX;
        let mut second = approved(&employee, "1", None);
        second.amount = Decimal::MAX;
        input.reimbursements = vec![first, second];
        let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(input, &context);

        match result {
            Err(PayrollError::Computation { message }) => {
                assert!(message.contains("reimbursements total"));
            }
            other => panic!("expected a computation error, got {:?}", other),
        }
    }

    #[test]
    fn test_overtime_overflow_is_an_error() {
        let period = february();
        let employee = Employee::new("jdoe", Decimal::MAX);
        let mut input = records(employee.clone());
        input.overtime = vec![
            OvertimeRecord::new(employee.id, make_date("2026-02-03"), 3, Decimal::MAX).unwrap(),
        ];
        let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

        let result = aggregate_employee(input, &context);

        assert!(matches!(result, Err(PayrollError::Computation { .. })));
    }

    proptest! {
        #[test]
        fn prop_take_home_is_sum_of_components(
            salary_cents in 0i64..100_000_000,
            attended in 0usize..20,
            overtime_hours in proptest::collection::vec(1u32..=3, 0..6),
            reimbursement_cents in proptest::collection::vec(1i64..1_000_000, 0..4),
        ) {
            let period = february();
            let employee = Employee::new("prop", Decimal::new(salary_cents, 2));
            let days = weekdays_of_february();
            let mut input = records(employee.clone());
            input.attendance = days
                .iter()
                .take(attended)
                .map(|d| attend(&employee, &period, d))
                .collect();
            input.overtime = overtime_hours
                .iter()
                .zip(days.iter())
                .map(|(h, d)| OvertimeRecord::new(employee.id, make_date(d), *h, Decimal::TWO).unwrap())
                .collect();
            input.reimbursements = reimbursement_cents
                .iter()
                .map(|c| {
                    let mut r = approved(&employee, "1", None);
                    r.amount = Decimal::new(*c, 2);
                    r
                })
                .collect();
            let context = AggregationContext::new(&period, 20, Uuid::new_v4(), "127.0.0.1");

            let result = aggregate_employee(input, &context).unwrap();

            prop_assert!(result.payslip.is_balanced());
            prop_assert_eq!(result.payslip.attendance_count as usize, attended);
            prop_assert!(result.payslip.prorated_salary <= employee.salary);
            prop_assert_eq!(result.paid_reimbursements.len(), reimbursement_cents.len());
        }
    }
}
