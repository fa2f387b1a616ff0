//! Reimbursement request model.
//!
//! A request becomes payable once approved, and is claimed ("paid") by the
//! first payroll run whose period it is eligible for.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult};

use super::amount::{deserialize_positive, ensure_positive};

/// Lifecycle status of a reimbursement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReimbursementStatus {
    /// Submitted, awaiting review.
    Pending,
    /// Approved and waiting to be paid by a payroll run.
    Approved,
    /// Rejected; never paid.
    Rejected,
    /// Paid by a payroll run.
    Paid,
}

/// An employee's request to be reimbursed an amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementRequest {
    /// Unique identifier for the request.
    pub id: Uuid,
    /// The employee asking to be reimbursed.
    pub employee_id: Uuid,
    /// The period the request is bound to, if any.
    #[serde(default)]
    pub period_id: Option<Uuid>,
    /// What the expense was for.
    pub description: String,
    /// The amount to reimburse. Always greater than zero.
    #[serde(deserialize_with = "deserialize_positive")]
    pub amount: Decimal,
    /// Current lifecycle status.
    pub status: ReimbursementStatus,
    /// The actor that last updated the request.
    #[serde(default)]
    pub updated_by: Option<Uuid>,
    /// Origin address of the last write.
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl ReimbursementRequest {
    /// Creates a pending, unbound request with a freshly generated id.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` unless `amount` is greater than zero.
    /// - `InvalidSubmission` if the description is blank.
    pub fn new(
        employee_id: Uuid,
        description: impl Into<String>,
        amount: Decimal,
    ) -> PayrollResult<Self> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(PayrollError::InvalidSubmission {
                message: "reimbursement description is required".to_string(),
            });
        }
        Ok(Self {
            id: Uuid::new_v4(),
            employee_id,
            period_id: None,
            description,
            amount: ensure_positive("amount", amount)?,
            status: ReimbursementStatus::Pending,
            updated_by: None,
            ip_address: None,
        })
    }

    /// Returns true if a run over `period_id` may pay this request.
    ///
    /// The request must be approved and either unbound or already bound to
    /// that same period.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::{ReimbursementRequest, ReimbursementStatus};
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let period = Uuid::new_v4();
    /// let mut request =
    ///     ReimbursementRequest::new(Uuid::new_v4(), "taxi", Decimal::from(150)).unwrap();
    /// assert!(!request.is_eligible_for(period));
    ///
    /// request.status = ReimbursementStatus::Approved;
    /// assert!(request.is_eligible_for(period));
    ///
    /// request.period_id = Some(Uuid::new_v4());
    /// assert!(!request.is_eligible_for(period));
    /// ```
    pub fn is_eligible_for(&self, period_id: Uuid) -> bool {
        self.status == ReimbursementStatus::Approved
            && self.period_id.is_none_or(|bound| bound == period_id)
    }

    /// Binds the request to `period_id` and marks it paid.
    pub fn mark_paid(&mut self, period_id: Uuid, actor_id: Uuid, ip_address: &str) {
        self.period_id = Some(period_id);
        self.status = ReimbursementStatus::Paid;
        self.updated_by = Some(actor_id);
        self.ip_address = Some(ip_address.to_string());
    }
}
