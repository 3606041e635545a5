// ============================================================================
// Domain Event Infrastructure
// ============================================================================
//
// Generic envelope + trait shared by every aggregate's events.
// Domain-specific events live in src/domain/.
//
// ============================================================================

pub mod envelope;

pub use envelope::{DomainEvent, EventEnvelope, serialize_event};
