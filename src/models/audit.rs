//! Audit entry model.
//!
//! Audit entries are append-only: the engine creates them and never
//! updates or deletes one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of actor that performed an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorType {
    /// An administrator.
    Admin,
    /// An employee acting on their own records.
    Employee,
    /// The system itself (scheduled or internal actions).
    System,
}

impl std::fmt::Display for ActorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorType::Admin => write!(f, "admin"),
            ActorType::Employee => write!(f, "employee"),
            ActorType::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for ActorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(ActorType::Admin),
            "employee" => Ok(ActorType::Employee),
            "system" => Ok(ActorType::System),
            other => Err(format!("unknown actor type '{}'", other)),
        }
    }
}

/// An immutable record of an action taken against the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier for the entry.
    pub id: Uuid,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// Who performed the action.
    pub actor_id: Uuid,
    /// What kind of actor performed the action.
    pub actor_type: ActorType,
    /// The action name (e.g., "run_payroll").
    pub action: String,
    /// The kind of resource acted on (e.g., "attendance_period").
    pub target_type: String,
    /// The resource acted on.
    pub target_id: Uuid,
    /// Structured detail of the action.
    pub payload: serde_json::Value,
    /// Origin address of the request.
    pub ip_address: String,
    /// Correlation id of the request.
    pub correlation_id: String,
}
