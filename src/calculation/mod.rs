//! Calculation logic for the payroll engine.
//!
//! This module contains the pure computations of a payroll run: working day
//! counting, per-employee aggregation of salary, overtime and
//! reimbursements, and rounding to the currency's minor unit.

mod employee_aggregator;
mod money;
mod working_days;

pub use employee_aggregator::{
    AggregationContext, DEFAULT_HOURS_PER_DAY, EmployeeAggregation, EmployeeRecords,
    aggregate_employee,
};
pub use money::{DEFAULT_CURRENCY_SCALE, round_money};
pub use working_days::{DayType, count_working_days, get_day_type};
