// ============================================================================
// Persistence Seams
// ============================================================================
//
// The workflow only ever talks to these traits. `memory` provides the
// in-process implementation used by the binary and the tests.
//
// ============================================================================

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::complaint::{Category, Complaint, ComplaintStatus, Department, HumanId};
use crate::domain::notification::{ListOptions, Notification};
use crate::domain::user::{DeviceRegistration, User};
use crate::error::StorageError;

pub use memory::{
    InMemoryComplaintStore, InMemoryDeviceRegistry, InMemoryNotificationStore, InMemoryUserDirectory,
};

pub type StorageResult<T> = Result<T, StorageError>;

/// Conjunctive complaint query; unset fields match everything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
    pub category: Option<Category>,
    pub department: Option<Department>,
    pub submitted_by: Option<Uuid>,
    pub assigned_to: Option<Uuid>,
    pub page: usize,
    pub limit: usize,
}

impl ComplaintFilter {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn assigned_to(officer: Uuid) -> Self {
        Self { assigned_to: Some(officer), ..Self::default() }
    }

    pub fn with_status(mut self, status: ComplaintStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, complaint: &Complaint) -> bool {
        self.status.map_or(true, |s| complaint.status == s)
            && self.category.map_or(true, |c| complaint.category == c)
            && self.department.map_or(true, |d| complaint.department == d)
            && self.submitted_by.map_or(true, |u| complaint.submitted_by == u)
            && self.assigned_to.map_or(true, |o| complaint.assigned_to == Some(o))
    }

    pub fn offset(&self) -> usize {
        self.page.max(1).saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for ComplaintFilter {
    fn default() -> Self {
        Self {
            status: None,
            category: None,
            department: None,
            submitted_by: None,
            assigned_to: None,
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OfficerFilter {
    pub active_only: bool,
}

#[async_trait]
pub trait ComplaintStore: Send + Sync {
    async fn find_complaint_by_id(&self, id: Uuid) -> StorageResult<Option<Complaint>>;

    async fn find_complaint_by_human_id(&self, human_id: &HumanId) -> StorageResult<Option<Complaint>>;

    /// Persist `complaint` if its `version` matches the stored one (0 for a
    /// new complaint). Returns the new version.
    async fn save_complaint(&self, complaint: &Complaint) -> StorageResult<i64>;

    /// Returns false when nothing was deleted
    async fn delete_complaint_by_id(&self, id: Uuid) -> StorageResult<bool>;

    /// Newest first, paginated by `filter.page`/`filter.limit`
    async fn find_complaints(&self, filter: &ComplaintFilter) -> StorageResult<Vec<Complaint>>;

    /// Ignores pagination
    async fn count_complaints(&self, filter: &ComplaintFilter) -> StorageResult<usize>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user_by_id(&self, id: Uuid) -> StorageResult<Option<User>>;

    /// Officers ordered by account creation, oldest first
    async fn find_officers(&self, filter: OfficerFilter) -> StorageResult<Vec<User>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: &Notification) -> StorageResult<()>;

    /// Newest first
    async fn list_for_user(&self, user_id: Uuid, options: ListOptions) -> StorageResult<Vec<Notification>>;

    /// None when the notification does not exist or belongs to someone else
    async fn mark_read(&self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> StorageResult<Option<Notification>>;

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> StorageResult<usize>;

    async fn unread_count(&self, user_id: Uuid) -> StorageResult<usize>;

    /// Ownership-scoped; false when nothing was deleted
    async fn delete(&self, id: Uuid, user_id: Uuid) -> StorageResult<bool>;
}

#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Tokens are unique: registering a known token replaces its entry,
    /// moving it to `device.user_id` if another user held it.
    async fn register(&self, device: &DeviceRegistration) -> StorageResult<()>;

    /// Registration order; re-registering a token moves it last
    async fn devices_for(&self, user_id: Uuid) -> StorageResult<Vec<DeviceRegistration>>;
}
