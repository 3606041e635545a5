use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::complaint::{
    Complaint, ComplaintPage, ComplaintPatch, ComplaintStats, ComplaintWorkflow, NewComplaint,
    WorkflowOutcome, WorkflowResult,
};
use crate::domain::notification::{
    ListOptions, Notification, NotificationDispatcher, NotificationInbox, NotificationPage,
};
use crate::domain::user::DeviceRegistration;
use crate::error::WorkflowError;
use crate::metrics::Metrics;
use crate::push::{GuardedPushHook, PushHook};
use crate::store::{ComplaintFilter, ComplaintStore, DeviceRegistry, NotificationStore, UserDirectory};

// ============================================================================
// Complaint Service
// ============================================================================
//
// What the HTTP layer calls. Each mutating call runs the workflow, records
// metrics, then awaits dispatch of the emitted events before returning.
// Dispatch never fails the call.
//
// ============================================================================

pub struct ComplaintService {
    workflow: ComplaintWorkflow,
    dispatcher: NotificationDispatcher,
    inbox: NotificationInbox,
    devices: Arc<dyn DeviceRegistry>,
    metrics: Arc<Metrics>,
}

/// Everything the service needs from the outside
pub struct ServiceDeps {
    pub complaints: Arc<dyn ComplaintStore>,
    pub users: Arc<dyn UserDirectory>,
    pub notifications: Arc<dyn NotificationStore>,
    pub devices: Arc<dyn DeviceRegistry>,
    pub push: Arc<dyn PushHook>,
    pub metrics: Arc<Metrics>,
}

impl ComplaintService {
    pub fn new(
        workflow: ComplaintWorkflow,
        dispatcher: NotificationDispatcher,
        inbox: NotificationInbox,
        devices: Arc<dyn DeviceRegistry>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self { workflow, dispatcher, inbox, devices, metrics }
    }

    /// Wire the workflow, dispatcher and inbox from config
    pub fn from_config(config: &AppConfig, deps: ServiceDeps) -> Self {
        let routing = config.routing_strategy.build(deps.complaints.clone());
        let workflow = ComplaintWorkflow::new(deps.complaints, deps.users, routing, config.workflow());

        let push = GuardedPushHook::new(deps.push, deps.devices.clone(), config.push_breaker());
        let dispatcher = NotificationDispatcher::new(deps.notifications.clone(), push, deps.metrics.clone());
        let inbox = NotificationInbox::new(deps.notifications, config.notification_page_limit);

        Self::new(workflow, dispatcher, inbox, deps.devices, deps.metrics)
    }

    // ========================================================================
    // Complaint operations
    // ========================================================================

    pub async fn create_complaint(&self, input: NewComplaint, submitted_by: Uuid) -> WorkflowResult<Complaint> {
        let complaint = self
            .run("create", self.workflow.create(input, submitted_by))
            .await?;
        self.metrics.record_complaint_created(complaint.category.as_str());
        Ok(complaint)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
        actor: Uuid,
        notes: Option<String>,
    ) -> WorkflowResult<Complaint> {
        let started = Instant::now();
        let result = self.workflow.update_status(id, status, actor, notes).await;

        // Previous status is the second to last history entry
        if let Ok(outcome) = &result {
            let history = &outcome.value.status_history;
            if let Some(previous) = history.len().checked_sub(2).and_then(|i| history.get(i)) {
                self.metrics
                    .record_status_change(previous.status.as_str(), outcome.value.status.as_str());
            }
        }

        self.finish("update_status", started, result).await
    }

    pub async fn assign_officer(&self, id: Uuid, officer_id: Uuid, actor: Uuid) -> WorkflowResult<Complaint> {
        self.run("assign_officer", self.workflow.assign_officer(id, officer_id, actor))
            .await
    }

    pub async fn add_comment(&self, id: Uuid, author: Uuid, text: impl Into<String>) -> WorkflowResult<Complaint> {
        self.run("add_comment", self.workflow.add_comment(id, author, text.into()))
            .await
    }

    pub async fn update_complaint(&self, id: Uuid, patch: ComplaintPatch, actor: Uuid) -> WorkflowResult<Complaint> {
        self.run("update_complaint", self.workflow.update_details(id, patch, actor))
            .await
    }

    pub async fn delete_complaint(&self, id: Uuid) -> WorkflowResult<()> {
        let started = Instant::now();
        let result = self.workflow.delete(id).await;
        self.observe("delete", started, &result);
        result
    }

    pub async fn get_complaint(&self, id: Uuid) -> WorkflowResult<Complaint> {
        self.workflow.get(id).await
    }

    pub async fn get_complaint_by_human_id(&self, human_id: &str) -> WorkflowResult<Complaint> {
        self.workflow.get_by_human_id(human_id).await
    }

    pub async fn list_complaints(&self, filter: ComplaintFilter) -> WorkflowResult<ComplaintPage> {
        self.workflow.list(filter).await
    }

    pub async fn complaint_stats(&self) -> WorkflowResult<ComplaintStats> {
        self.workflow.stats().await
    }

    // ========================================================================
    // Notification operations
    // ========================================================================

    pub async fn list_notifications(&self, user_id: Uuid, options: ListOptions) -> WorkflowResult<NotificationPage> {
        self.inbox.list(user_id, options).await
    }

    pub async fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> WorkflowResult<Notification> {
        self.inbox.mark_read(id, user_id).await
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> WorkflowResult<usize> {
        self.inbox.mark_all_read(user_id).await
    }

    pub async fn unread_count(&self, user_id: Uuid) -> WorkflowResult<usize> {
        self.inbox.unread_count(user_id).await
    }

    pub async fn delete_notification(&self, id: Uuid, user_id: Uuid) -> WorkflowResult<()> {
        self.inbox.delete(id, user_id).await
    }

    /// Add a push target for `user_id`. The token must not be blank; a
    /// missing platform is recorded as "unknown".
    pub async fn register_device(
        &self,
        user_id: Uuid,
        token: &str,
        platform: Option<&str>,
    ) -> WorkflowResult<DeviceRegistration> {
        if token.trim().is_empty() {
            return Err(WorkflowError::InvalidRequest("Device token is required".to_string()));
        }

        let device = DeviceRegistration::new(user_id, token, platform, Utc::now());
        self.devices.register(&device).await?;
        tracing::info!(user_id = %user_id, platform = %device.platform, "Device registered for push");
        Ok(device)
    }

    /// Best effort; None when the notification could not be stored
    pub async fn send_general_notification(
        &self,
        recipient: Uuid,
        title: &str,
        message: &str,
        related_complaint: Option<Uuid>,
    ) -> Option<Notification> {
        self.dispatcher
            .send_general(recipient, title, message, related_complaint)
            .await
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    async fn run<F>(&self, operation: &'static str, call: F) -> WorkflowResult<Complaint>
    where
        F: std::future::Future<Output = WorkflowResult<WorkflowOutcome<Complaint>>>,
    {
        let started = Instant::now();
        let result = call.await;
        self.finish(operation, started, result).await
    }

    async fn finish(
        &self,
        operation: &'static str,
        started: Instant,
        result: WorkflowResult<WorkflowOutcome<Complaint>>,
    ) -> WorkflowResult<Complaint> {
        self.observe(operation, started, &result);

        let (complaint, events) = result?.into_parts();
        let sent = self.dispatcher.dispatch_all(&events).await;
        if sent.len() < events.len() {
            tracing::warn!(
                operation,
                complaint_id = %complaint.id,
                emitted = events.len(),
                stored = sent.len(),
                "Some notifications were not stored"
            );
        }
        Ok(complaint)
    }

    fn observe<T>(&self, operation: &'static str, started: Instant, result: &WorkflowResult<T>) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(e) => {
                tracing::warn!(operation, error = %e, "Workflow operation failed");
                e.kind()
            }
        };
        self.metrics
            .record_operation(operation, outcome, started.elapsed().as_secs_f64());
    }
}
