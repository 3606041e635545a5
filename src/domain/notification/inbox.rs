use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::store::NotificationStore;

use super::value_objects::{ListOptions, Notification};

/// One page of a user's notifications plus their current unread total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
    pub page: usize,
    pub limit: usize,
}

/// Read-side operations on a user's notifications. Every call is scoped to
/// the owning user; someone else's notification reads as not found.
pub struct NotificationInbox {
    store: Arc<dyn NotificationStore>,
    default_limit: usize,
}

impl NotificationInbox {
    pub fn new(store: Arc<dyn NotificationStore>, default_limit: usize) -> Self {
        Self { store, default_limit }
    }

    pub async fn list(&self, user_id: Uuid, options: ListOptions) -> Result<NotificationPage, WorkflowError> {
        let options = options.normalized(self.default_limit);
        let notifications = self.store.list_for_user(user_id, options).await?;
        let unread_count = self.store.unread_count(user_id).await?;

        Ok(NotificationPage {
            notifications,
            unread_count,
            page: options.page,
            limit: options.limit,
        })
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Notification, WorkflowError> {
        self.store
            .mark_read(id, user_id, Utc::now())
            .await?
            .ok_or_else(|| WorkflowError::notification_not_found(id))
    }

    /// Returns how many notifications changed
    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<usize, WorkflowError> {
        let updated = self.store.mark_all_read(user_id, Utc::now()).await?;
        tracing::debug!(user_id = %user_id, updated, "Marked all notifications read");
        Ok(updated)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<usize, WorkflowError> {
        Ok(self.store.unread_count(user_id).await?)
    }

    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<(), WorkflowError> {
        if !self.store.delete(id, user_id).await? {
            return Err(WorkflowError::notification_not_found(id));
        }
        Ok(())
    }
}
