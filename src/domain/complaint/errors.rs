use uuid::Uuid;

// ============================================================================
// Complaint Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComplaintError {
    #[error("Title is required")]
    EmptyTitle,

    #[error("Title cannot exceed {max} characters (got {actual})")]
    TitleTooLong { max: usize, actual: usize },

    #[error("Description is required")]
    EmptyDescription,

    #[error("Invalid category: {0}")]
    UnknownCategory(String),

    #[error("Invalid status: {0}. Must be one of: Pending, In Progress, Resolved, Rejected")]
    UnknownStatus(String),

    #[error("Invalid officer: {0}")]
    InvalidOfficer(Uuid),

    #[error("Comment text cannot be empty")]
    EmptyComment,
}
