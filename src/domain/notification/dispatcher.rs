use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::complaint::ComplaintEvent;
use crate::error::NotificationDeliveryError;
use crate::events::{serialize_event, EventEnvelope};
use crate::metrics::Metrics;
use crate::push::GuardedPushHook;
use crate::store::NotificationStore;

use super::render::render;
use super::value_objects::{Notification, NotificationDraft, NotificationType};

// ============================================================================
// Notification Dispatcher
// ============================================================================
//
// Event → Draft → Persist → Push
//
// Best effort end to end: every failure is logged, counted and swallowed here.
// A persistence failure drops the notification; a push failure does not.
//
// ============================================================================

pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    push: GuardedPushHook,
    metrics: Arc<Metrics>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn NotificationStore>, push: GuardedPushHook, metrics: Arc<Metrics>) -> Self {
        Self { store, push, metrics }
    }

    /// Persist and push the notification for one event.
    /// Returns None when the notification could not be stored.
    pub async fn send(&self, envelope: &EventEnvelope<ComplaintEvent>) -> Option<Notification> {
        if let Ok(json) = serialize_event(envelope) {
            tracing::debug!(event_id = %envelope.event_id, payload = %json, "Dispatching event");
        }

        let draft = render(&envelope.event_data);
        match self.deliver(draft).await {
            Ok(notification) => Some(notification),
            Err(e) => {
                tracing::error!(
                    event_type = %envelope.event_type,
                    complaint_id = %envelope.aggregate_id,
                    recipient = %envelope.event_data.recipient(),
                    error = %e,
                    "Notification dropped"
                );
                None
            }
        }
    }

    /// Send every event in order; one failure does not stop the rest
    pub async fn dispatch_all(&self, envelopes: &[EventEnvelope<ComplaintEvent>]) -> Vec<Notification> {
        let mut sent = Vec::with_capacity(envelopes.len());
        for envelope in envelopes {
            if let Some(notification) = self.send(envelope).await {
                sent.push(notification);
            }
        }
        sent
    }

    /// Free-form notification not tied to a complaint event
    pub async fn send_general(
        &self,
        recipient: Uuid,
        title: impl Into<String>,
        message: impl Into<String>,
        related_complaint: Option<Uuid>,
    ) -> Option<Notification> {
        let draft = NotificationDraft {
            recipient,
            kind: NotificationType::General,
            title: title.into(),
            message: message.into(),
            related_complaint,
        };

        match self.deliver(draft).await {
            Ok(notification) => Some(notification),
            Err(e) => {
                tracing::error!(recipient = %recipient, error = %e, "General notification dropped");
                None
            }
        }
    }

    async fn deliver(&self, draft: NotificationDraft) -> Result<Notification, NotificationDeliveryError> {
        let kind = draft.kind.as_str();
        let notification = Notification::from_draft(draft, Utc::now());

        if let Err(e) = self.store.insert(&notification).await {
            self.metrics.record_notification_failure(kind, "persist");
            return Err(e.into());
        }
        self.metrics.record_notification_persisted(kind);

        if let Err(e) = self.push.deliver(&notification).await {
            self.metrics.record_notification_failure(kind, e.stage());
            tracing::warn!(
                notification_id = %notification.id,
                recipient = %notification.recipient,
                kind,
                error = %e,
                "Push delivery failed, notification kept"
            );
        }
        self.metrics.update_push_circuit_state(self.push.state().await);

        tracing::debug!(
            notification_id = %notification.id,
            recipient = %notification.recipient,
            kind,
            "Notification stored"
        );
        Ok(notification)
    }
}
