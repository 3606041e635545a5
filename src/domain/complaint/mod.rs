// ============================================================================
// Complaint Domain - Business Logic for the Complaint Aggregate
// ============================================================================
//
// - Value objects (Category, Department, ComplaintStatus, HumanId, ...)
// - Events (ComplaintSubmitted, ComplaintStatusUpdated, ...)
// - Commands (NewComplaint, ComplaintCommand, ...)
// - Errors (ComplaintError)
// - Aggregate (Complaint with its invariants)
// - Workflow (ComplaintWorkflow: load → execute → save → events)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod workflow;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use workflow::*;
