//! Payroll engine for attendance-based salaries.
//!
//! This crate computes payroll for a fixed attendance period: prorated
//! salary from attendance, overtime pay and approved reimbursements are
//! combined into one payslip per employee and committed, together with the
//! period's finalization and an audit entry, exactly once per period.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod payroll;
pub mod store;
