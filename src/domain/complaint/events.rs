use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::events::DomainEvent;
use super::value_objects::{Category, ComplaintStatus, HumanId};

// ============================================================================
// Complaint Events - Notification-worthy facts emitted by the workflow
// ============================================================================
//
// Every event names exactly one recipient. The workflow decides who hears
// about what; the dispatcher only renders and delivers.
//
// ============================================================================

/// Snapshot of the complaint fields events need for rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintRef {
    pub complaint_id: Uuid,
    pub human_id: HumanId,
    pub title: String,
    pub category: Category,
}

/// Which side of the complaint a recipient is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    Citizen,
    Officer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ComplaintEvent {
    Submitted(ComplaintSubmitted),
    Assigned(ComplaintAssigned),
    StatusUpdated(ComplaintStatusUpdated),
    Resolved(ComplaintResolved),
    OfficerAssigned(OfficerAssigned),
    CommentAdded(CommentAdded),
}

impl ComplaintEvent {
    pub fn recipient(&self) -> Uuid {
        match self {
            ComplaintEvent::Submitted(e) => e.recipient,
            ComplaintEvent::Assigned(e) => e.recipient,
            ComplaintEvent::StatusUpdated(e) => e.recipient,
            ComplaintEvent::Resolved(e) => e.recipient,
            ComplaintEvent::OfficerAssigned(e) => e.recipient,
            ComplaintEvent::CommentAdded(e) => e.recipient,
        }
    }

    pub fn complaint(&self) -> &ComplaintRef {
        match self {
            ComplaintEvent::Submitted(e) => &e.complaint,
            ComplaintEvent::Assigned(e) => &e.complaint,
            ComplaintEvent::StatusUpdated(e) => &e.complaint,
            ComplaintEvent::Resolved(e) => &e.complaint,
            ComplaintEvent::OfficerAssigned(e) => &e.complaint,
            ComplaintEvent::CommentAdded(e) => &e.complaint,
        }
    }
}

impl DomainEvent for ComplaintEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ComplaintEvent::Submitted(_) => "ComplaintSubmitted",
            ComplaintEvent::Assigned(_) => "ComplaintAssigned",
            ComplaintEvent::StatusUpdated(_) => "StatusUpdated",
            ComplaintEvent::Resolved(_) => "ComplaintResolved",
            ComplaintEvent::OfficerAssigned(_) => "OfficerAssigned",
            ComplaintEvent::CommentAdded(_) => "CommentAdded",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Complaint Submitted - sent to the submitting citizen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintSubmitted {
    pub recipient: Uuid,
    pub complaint: ComplaintRef,
}

/// Complaint Assigned - sent to the officer now responsible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintAssigned {
    pub recipient: Uuid,
    pub complaint: ComplaintRef,
    /// True when the routing policy picked the officer at creation time
    pub auto_routed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintStatusUpdated {
    pub recipient: Uuid,
    pub complaint: ComplaintRef,
    pub audience: Audience,
    pub old_status: ComplaintStatus,
    pub new_status: ComplaintStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintResolved {
    pub recipient: Uuid,
    pub complaint: ComplaintRef,
}

/// Officer Assigned - tells the citizen someone picked up the complaint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficerAssigned {
    pub recipient: Uuid,
    pub complaint: ComplaintRef,
    pub officer_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAdded {
    pub recipient: Uuid,
    pub complaint: ComplaintRef,
    pub audience: Audience,
    pub author: Uuid,
}
