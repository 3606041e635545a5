use uuid::Uuid;

use crate::domain::complaint::ComplaintError;

// ============================================================================
// Error Taxonomy
// ============================================================================
//
// StorageError              - persistence backend failures
// WorkflowError             - what callers of the service observe
// NotificationDeliveryError - never leaves the dispatcher
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend failure: {0}")]
    Backend(String),

    #[error("Concurrency conflict on {id}: expected version {expected}, but current is {actual}")]
    VersionConflict { id: Uuid, expected: i64, actual: i64 },

    #[error("Complaint id already in use: {0}")]
    DuplicateHumanId(String),

    #[error("No free complaint id after {0} attempts")]
    HumanIdExhausted(u32),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorkflowError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ComplaintError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl WorkflowError {
    pub fn complaint_not_found(id: impl ToString) -> Self {
        WorkflowError::NotFound { entity: "Complaint", id: id.to_string() }
    }

    pub fn notification_not_found(id: Uuid) -> Self {
        WorkflowError::NotFound { entity: "Notification", id: id.to_string() }
    }

    /// Short label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::Validation(_) | WorkflowError::InvalidRequest(_) => "validation",
            WorkflowError::NotFound { .. } => "not_found",
            WorkflowError::Storage(_) => "storage",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationDeliveryError {
    #[error("Failed to persist notification: {0}")]
    Persist(#[from] StorageError),

    #[error("Failed to look up push targets: {0}")]
    Targets(StorageError),

    #[error("Push delivery failed: {0}")]
    Push(anyhow::Error),

    #[error("Push delivery skipped, circuit breaker open")]
    CircuitOpen,
}

impl NotificationDeliveryError {
    pub fn stage(&self) -> &'static str {
        match self {
            NotificationDeliveryError::Persist(_) => "persist",
            NotificationDeliveryError::Targets(_)
            | NotificationDeliveryError::Push(_)
            | NotificationDeliveryError::CircuitOpen => "push",
        }
    }
}
