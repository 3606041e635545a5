use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::notification::Notification;
use crate::domain::user::DeviceRegistration;
use crate::error::NotificationDeliveryError;
use crate::store::DeviceRegistry;
use crate::utils::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};

// ============================================================================
// Real-time Push Hook
// ============================================================================
//
// Called after a notification has been persisted, with the recipient's
// registered devices. The list may be empty; a live channel keyed by user id
// can still reach them. Delivery is fire-and-forget from the workflow's point
// of view: the dispatcher logs and counts failures.
//
// ============================================================================

#[async_trait]
pub trait PushHook: Send + Sync {
    /// Deliver a persisted notification to the recipient's live channel and devices
    async fn deliver(&self, notification: &Notification, devices: &[DeviceRegistration]) -> Result<()>;
}

/// Default hook for deployments without a live channel
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingPushHook;

#[async_trait]
impl PushHook for LoggingPushHook {
    async fn deliver(&self, notification: &Notification, devices: &[DeviceRegistration]) -> Result<()> {
        tracing::debug!(
            notification_id = %notification.id,
            recipient = %notification.recipient,
            kind = notification.kind.as_str(),
            devices = devices.len(),
            "Push delivered"
        );
        Ok(())
    }
}

/// Keeps every delivered notification, and the device tokens it went to, in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingPushHook {
    delivered: Arc<Mutex<Vec<(Notification, Vec<String>)>>>,
}

impl RecordingPushHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|d| d.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }

    /// Device tokens targeted for `notification_id`, empty if never delivered
    pub fn tokens_for(&self, notification_id: uuid::Uuid) -> Vec<String> {
        self.delivered
            .lock()
            .ok()
            .and_then(|d| d.iter().find(|(n, _)| n.id == notification_id).map(|(_, t)| t.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl PushHook for RecordingPushHook {
    async fn deliver(&self, notification: &Notification, devices: &[DeviceRegistration]) -> Result<()> {
        let tokens = devices.iter().map(|d| d.token.clone()).collect();
        self.delivered
            .lock()
            .map_err(|_| anyhow::anyhow!("push recorder poisoned"))?
            .push((notification.clone(), tokens));
        Ok(())
    }
}

/// A push hook behind a circuit breaker, fed from the device registry.
/// Only the hook call counts towards the breaker; a registry failure does not.
#[derive(Clone)]
pub struct GuardedPushHook {
    inner: Arc<dyn PushHook>,
    devices: Arc<dyn DeviceRegistry>,
    breaker: CircuitBreaker,
}

impl GuardedPushHook {
    pub fn new(inner: Arc<dyn PushHook>, devices: Arc<dyn DeviceRegistry>, config: CircuitBreakerConfig) -> Self {
        Self { inner, devices, breaker: CircuitBreaker::new("push", config) }
    }

    pub async fn deliver(&self, notification: &Notification) -> Result<(), NotificationDeliveryError> {
        let devices = self
            .devices
            .devices_for(notification.recipient)
            .await
            .map_err(NotificationDeliveryError::Targets)?;

        self.breaker
            .call(self.inner.deliver(notification, &devices))
            .await
            .map_err(|e| match e {
                CircuitBreakerError::CircuitOpen => NotificationDeliveryError::CircuitOpen,
                CircuitBreakerError::OperationFailed(e) => NotificationDeliveryError::Push(e),
            })
    }

    pub async fn state(&self) -> CircuitState {
        self.breaker.state().await
    }
}
