use crate::domain::complaint::{Audience, ComplaintEvent};

use super::value_objects::{NotificationDraft, NotificationType};

/// Turn a complaint event into the notification its recipient will see
pub fn render(event: &ComplaintEvent) -> NotificationDraft {
    let complaint = event.complaint();
    let title = &complaint.title;

    let (kind, heading, message) = match event {
        ComplaintEvent::Submitted(_) => (
            NotificationType::ComplaintSubmitted,
            "Complaint Submitted",
            format!(
                "Your complaint \"{}\" has been submitted successfully. Complaint ID: {}",
                title, complaint.human_id
            ),
        ),
        ComplaintEvent::Assigned(e) if e.auto_routed => (
            NotificationType::ComplaintAssigned,
            "New Complaint Assigned",
            format!("You have been assigned a new {} complaint: {}", complaint.category, title),
        ),
        ComplaintEvent::Assigned(_) => (
            NotificationType::ComplaintAssigned,
            "Complaint Assigned",
            format!("You have been assigned a new complaint: {}", title),
        ),
        ComplaintEvent::StatusUpdated(e) => {
            let message = match e.audience {
                Audience::Citizen => format!(
                    "Your complaint \"{}\" status has been changed from {} to {}.",
                    title, e.old_status, e.new_status
                ),
                Audience::Officer => format!(
                    "Complaint \"{}\" status has been changed to {}.",
                    title, e.new_status
                ),
            };
            (NotificationType::StatusUpdate, "Complaint Status Updated", message)
        }
        ComplaintEvent::Resolved(_) => (
            NotificationType::ComplaintResolved,
            "Complaint Resolved",
            format!("Great news! Your complaint \"{}\" has been resolved.", title),
        ),
        ComplaintEvent::OfficerAssigned(_) => (
            NotificationType::OfficerAssigned,
            "Officer Assigned",
            format!("An officer has been assigned to your complaint \"{}\".", title),
        ),
        ComplaintEvent::CommentAdded(e) => match e.audience {
            Audience::Officer => (
                NotificationType::CommentAdded,
                "New Comment on Complaint",
                format!("A comment has been added to complaint \"{}\"", title),
            ),
            Audience::Citizen => (
                NotificationType::CommentAdded,
                "New Comment on Your Complaint",
                format!("An officer has added a comment to your complaint \"{}\"", title),
            ),
        },
    };

    NotificationDraft {
        recipient: event.recipient(),
        kind,
        title: heading.to_string(),
        message,
        related_complaint: Some(complaint.complaint_id),
    }
}
