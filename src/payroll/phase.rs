//! Phases of engine operations, used to attribute storage failures.

use serde::Serialize;

/// What the engine was doing when an operation failed.
///
/// A run moves `Validating -> (ZeroWorkingDays | Computing) -> Committing`.
/// The other operations each have a single phase. A storage failure in any
/// phase aborts the operation and is reported with the phase it occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Loading and locking the period, checking it is unprocessed.
    Validating,
    /// Finalizing a period that has no working days.
    ZeroWorkingDays,
    /// Gathering records and aggregating payslips.
    Computing,
    /// Writing payslips, reimbursements, the period and the audit entry.
    Committing,
    /// Creating an attendance period.
    CreatingPeriod,
    /// Recording an attendance, overtime or reimbursement submission.
    Submitting,
    /// Answering a read-only query outside a run.
    Querying,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunPhase::Validating => "validating",
            RunPhase::ZeroWorkingDays => "recording zero working days",
            RunPhase::Computing => "computing",
            RunPhase::Committing => "committing",
            RunPhase::CreatingPeriod => "creating a period",
            RunPhase::Submitting => "recording a submission",
            RunPhase::Querying => "querying",
        };
        f.write_str(name)
    }
}
