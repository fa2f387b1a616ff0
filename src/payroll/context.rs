//! Caller identity attached to every engine operation.

use uuid::Uuid;

use crate::models::ActorType;

/// Who is calling the engine, from where, and under which correlation id.
///
/// # Example
///
/// ```
/// use payroll_engine::models::ActorType;
/// use payroll_engine::payroll::RequestContext;
/// use uuid::Uuid;
///
/// let context = RequestContext::new(Uuid::new_v4(), ActorType::Admin, "10.0.0.7")
///     .with_correlation_id("req-42");
/// assert_eq!(context.correlation_id, "req-42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// The acting user.
    pub actor_id: Uuid,
    /// What kind of actor the user is.
    pub actor_type: ActorType,
    /// Origin address of the request.
    pub source_address: String,
    /// Identifier tying log lines and audit entries to one request.
    pub correlation_id: String,
}

impl RequestContext {
    /// Creates a context with a freshly generated correlation id.
    pub fn new(actor_id: Uuid, actor_type: ActorType, source_address: impl Into<String>) -> Self {
        Self {
            actor_id,
            actor_type,
            source_address: source_address.into(),
            correlation_id: Uuid::new_v4().to_string(),
        }
    }

    /// Replaces the correlation id.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_distinct_correlation_ids() {
        let actor = Uuid::new_v4();
        let first = RequestContext::new(actor, ActorType::Admin, "127.0.0.1");
        let second = RequestContext::new(actor, ActorType::Admin, "127.0.0.1");
        assert_ne!(first.correlation_id, second.correlation_id);
    }
}
