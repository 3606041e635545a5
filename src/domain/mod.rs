// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Complaint lifecycle, user accounts and notifications. Nothing in here
// knows how data is stored or how pushes are delivered.
//
// ============================================================================

pub mod complaint;
pub mod notification;
pub mod user;
