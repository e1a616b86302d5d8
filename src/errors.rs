use thiserror::Error;
use uuid::Uuid;

/// Error type returned by every service operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    /// Rejection for an operation invoked in the wrong lifecycle state,
    /// naming the expected and actual states.
    pub fn invalid_transition(operation: &str, expected: &str, actual: impl std::fmt::Display) -> Self {
        ServiceError::InvalidStatus(format!(
            "cannot {operation}: expected status {expected}, found '{actual}'"
        ))
    }

    pub fn order_not_found(order_id: Uuid) -> Self {
        ServiceError::NotFound(format!("Service order {order_id} not found"))
    }

    pub fn vehicle_not_found(vehicle_id: Uuid) -> Self {
        ServiceError::NotFound(format!("Vehicle {vehicle_id} not found"))
    }

    pub fn supplier_not_found(supplier_id: Uuid) -> Self {
        ServiceError::NotFound(format!("Supplier {supplier_id} not found"))
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_names_both_states() {
        let err = ServiceError::invalid_transition("start execution", "approved_awaiting_execution", "completed");
        let msg = err.to_string();
        assert!(msg.contains("approved_awaiting_execution"));
        assert!(msg.contains("completed"));
    }

    #[test]
    fn validation_errors_convert() {
        use validator::Validate;

        #[derive(Validate)]
        struct Probe {
            #[validate(length(min = 1))]
            name: String,
        }

        let err: ServiceError = Probe { name: String::new() }.validate().unwrap_err().into();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }
}
