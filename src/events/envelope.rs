use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use anyhow::Result;

// ============================================================================
// Event Envelope - Event Metadata
// ============================================================================
//
// Wraps domain events with the metadata the dispatch stage and the logs need.
// Generic over the event type.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    /// Position of the event within the operation that produced it (1-based)
    pub sequence_number: i64,

    pub event_type: String,
    pub event_version: i32,

    pub event_data: E,

    // Groups all events emitted by one workflow operation
    pub correlation_id: Uuid,

    // Who triggered this event
    pub actor_id: Option<Uuid>,

    pub timestamp: DateTime<Utc>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(
        aggregate_id: Uuid,
        sequence_number: i64,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id,
            sequence_number,
            event_type: event_data.event_type().to_string(),
            event_version: event_data.event_version(),
            event_data,
            correlation_id,
            actor_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor_id: Uuid) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Wrap the events of one operation, sharing a fresh correlation id
    pub fn wrap_all(aggregate_id: Uuid, actor_id: Uuid, events: Vec<E>) -> Vec<Self> {
        let correlation_id = Uuid::new_v4();
        events
            .into_iter()
            .enumerate()
            .map(|(i, event)| {
                Self::new(aggregate_id, i as i64 + 1, event, correlation_id).with_actor(actor_id)
            })
            .collect()
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

pub trait DomainEvent: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync {
    fn event_type(&self) -> &'static str;
    fn event_version(&self) -> i32 { 1 }
}

pub fn serialize_event<E: Serialize>(event: &E) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    struct TestEvent {
        data: String,
    }

    impl DomainEvent for TestEvent {
        fn event_type(&self) -> &'static str { "TestEvent" }
    }

    #[test]
    fn test_event_envelope_creation() {
        let aggregate_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();

        let envelope = EventEnvelope::new(
            aggregate_id,
            1,
            TestEvent { data: "test".to_string() },
            correlation_id,
        );

        assert_eq!(envelope.aggregate_id, aggregate_id);
        assert_eq!(envelope.sequence_number, 1);
        assert_eq!(envelope.event_type, "TestEvent");
        assert_eq!(envelope.event_version, 1);
        assert_eq!(envelope.correlation_id, correlation_id);
        assert!(envelope.actor_id.is_none());
    }

    #[test]
    fn test_wrap_all_shares_correlation() {
        let aggregate_id = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let events = vec![
            TestEvent { data: "a".to_string() },
            TestEvent { data: "b".to_string() },
        ];

        let wrapped = EventEnvelope::wrap_all(aggregate_id, actor, events);

        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].correlation_id, wrapped[1].correlation_id);
        assert_eq!(wrapped[0].sequence_number, 1);
        assert_eq!(wrapped[1].sequence_number, 2);
        assert_eq!(wrapped[1].actor_id, Some(actor));
        assert_ne!(wrapped[0].event_id, wrapped[1].event_id);
    }

    #[test]
    fn test_event_serialization() {
        let event = TestEvent { data: "test data".to_string() };

        let json = serialize_event(&event).unwrap();
        let deserialized: TestEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(event, deserialized);
    }
}
