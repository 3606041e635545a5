use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Notification Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    ComplaintSubmitted,
    ComplaintAssigned,
    StatusUpdate,
    ComplaintResolved,
    OfficerAssigned,
    CommentAdded,
    #[default]
    General,
}

impl NotificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationType::ComplaintSubmitted => "complaint_submitted",
            NotificationType::ComplaintAssigned => "complaint_assigned",
            NotificationType::StatusUpdate => "status_update",
            NotificationType::ComplaintResolved => "complaint_resolved",
            NotificationType::OfficerAssigned => "officer_assigned",
            NotificationType::CommentAdded => "comment_added",
            NotificationType::General => "general",
        }
    }
}

/// What the dispatcher knows before persistence assigns identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationDraft {
    pub recipient: Uuid,
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_complaint: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub related_complaint: Option<Uuid>,
    pub read: bool,
    /// Some exactly when `read`
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn from_draft(draft: NotificationDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: draft.recipient,
            kind: draft.kind,
            title: draft.title,
            message: draft.message,
            related_complaint: draft.related_complaint,
            read: false,
            read_at: None,
            created_at: now,
        }
    }

    pub fn mark_read(&mut self, now: DateTime<Utc>) {
        self.read = true;
        self.read_at = Some(now);
    }
}

/// Paging for a user's notification list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    pub unread_only: bool,
    pub page: usize,
    pub limit: usize,
}

impl ListOptions {
    pub const DEFAULT_LIMIT: usize = 50;

    pub fn unread() -> Self {
        Self { unread_only: true, ..Self::default() }
    }

    /// Page 0 reads as page 1, limit 0 as `fallback_limit`
    pub fn normalized(self, fallback_limit: usize) -> Self {
        Self {
            unread_only: self.unread_only,
            page: self.page.max(1),
            limit: if self.limit == 0 { fallback_limit } else { self.limit },
        }
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self { unread_only: false, page: 1, limit: Self::DEFAULT_LIMIT }
    }
}
