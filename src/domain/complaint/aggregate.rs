use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::commands::{ComplaintCommand, ComplaintPatch, NewComplaint};
use super::errors::ComplaintError;
use super::events::*;
use super::value_objects::*;

pub const MAX_TITLE_LEN: usize = 200;

// ============================================================================
// Complaint Aggregate - Domain Logic
// ============================================================================
//
// Invariants held by every method below:
// - department == category.department()
// - status_history is never empty and only ever appended to
// - resolved_at is Some exactly when status == Resolved
// - human_id and submitted_by never change after submission
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    // Identity
    pub id: Uuid,
    pub human_id: HumanId,
    /// Optimistic concurrency counter, 0 until first persisted
    pub version: i64,

    pub title: String,
    pub description: String,
    pub category: Category,
    pub department: Department,
    pub priority: Priority,
    pub location: Option<Location>,
    pub image_url: Option<String>,

    pub status: ComplaintStatus,
    pub submitted_by: Uuid,
    pub assigned_to: Option<Uuid>,

    pub comments: Vec<Comment>,
    pub status_history: Vec<StatusChange>,

    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_notes: Option<String>,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Complaint {
    /// Create a Pending complaint with its initial history entry and the
    /// submission (and, if routed, assignment) events.
    pub fn submit(
        human_id: HumanId,
        input: NewComplaint,
        submitted_by: Uuid,
        routed_to: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(Self, Vec<ComplaintEvent>), ComplaintError> {
        let title = validate_title(&input.title)?;
        let description = validate_description(&input.description)?;
        let category = parse_category(input.category.as_deref())?;

        let complaint = Self {
            id: Uuid::new_v4(),
            human_id,
            version: 0,
            title,
            description,
            category,
            department: category.department(),
            priority: input.priority.unwrap_or_default(),
            location: input.location,
            image_url: input.image_url,
            status: ComplaintStatus::Pending,
            submitted_by,
            assigned_to: routed_to,
            comments: Vec::new(),
            status_history: vec![StatusChange {
                status: ComplaintStatus::Pending,
                changed_by: submitted_by,
                changed_at: now,
                notes: Some("Complaint submitted".to_string()),
            }],
            resolved_at: None,
            resolution_notes: None,
            created_at: now,
            updated_at: now,
        };

        let mut events = vec![ComplaintEvent::Submitted(ComplaintSubmitted {
            recipient: submitted_by,
            complaint: complaint.summary(),
        })];

        if let Some(officer) = routed_to {
            events.push(ComplaintEvent::Assigned(ComplaintAssigned {
                recipient: officer,
                complaint: complaint.summary(),
                auto_routed: true,
            }));
        }

        Ok((complaint, events))
    }

    pub fn summary(&self) -> ComplaintRef {
        ComplaintRef {
            complaint_id: self.id,
            human_id: self.human_id.clone(),
            title: self.title.clone(),
            category: self.category,
        }
    }

    /// Apply a command in place and return the events it produced.
    /// On error the aggregate is left untouched.
    pub fn execute(
        &mut self,
        command: ComplaintCommand,
        now: DateTime<Utc>,
    ) -> Result<Vec<ComplaintEvent>, ComplaintError> {
        let events = match command {
            ComplaintCommand::ChangeStatus { status, changed_by, notes } => {
                self.change_status(status, changed_by, notes, now)
            }
            ComplaintCommand::AssignOfficer { officer_id, officer_name } => {
                self.assign_officer(officer_id, &officer_name, now)
            }
            ComplaintCommand::AddComment { author, text } => {
                self.add_comment(author, text, now)?
            }
            ComplaintCommand::UpdateDetails(patch) => {
                self.update_details(patch)?;
                Vec::new()
            }
        };

        self.updated_at = now;
        Ok(events)
    }

    fn change_status(
        &mut self,
        status: ComplaintStatus,
        changed_by: Uuid,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Vec<ComplaintEvent> {
        let old_status = self.status;
        let notes = notes.filter(|n| !n.trim().is_empty());

        self.status = status;
        self.status_history.push(StatusChange {
            status,
            changed_by,
            changed_at: now,
            notes: Some(
                notes
                    .clone()
                    .unwrap_or_else(|| format!("Status changed from {} to {}", old_status, status)),
            ),
        });

        if status == ComplaintStatus::Resolved {
            self.resolved_at = Some(now);
            if let Some(notes) = notes {
                self.resolution_notes = Some(notes);
            }
        } else {
            // Re-opening a resolved complaint drops the resolution timestamp
            self.resolved_at = None;
        }

        let mut events = vec![ComplaintEvent::StatusUpdated(ComplaintStatusUpdated {
            recipient: self.submitted_by,
            complaint: self.summary(),
            audience: Audience::Citizen,
            old_status,
            new_status: status,
        })];

        if let Some(officer) = self.assigned_to.filter(|o| *o != changed_by) {
            events.push(ComplaintEvent::StatusUpdated(ComplaintStatusUpdated {
                recipient: officer,
                complaint: self.summary(),
                audience: Audience::Officer,
                old_status,
                new_status: status,
            }));
        }

        if status == ComplaintStatus::Resolved {
            events.push(ComplaintEvent::Resolved(ComplaintResolved {
                recipient: self.submitted_by,
                complaint: self.summary(),
            }));
        }

        events
    }

    fn assign_officer(
        &mut self,
        officer_id: Uuid,
        officer_name: &str,
        now: DateTime<Utc>,
    ) -> Vec<ComplaintEvent> {
        self.assigned_to = Some(officer_id);
        self.status_history.push(StatusChange {
            status: self.status,
            changed_by: officer_id,
            changed_at: now,
            notes: Some(format!("Complaint assigned to officer: {}", officer_name)),
        });

        vec![
            ComplaintEvent::Assigned(ComplaintAssigned {
                recipient: officer_id,
                complaint: self.summary(),
                auto_routed: false,
            }),
            ComplaintEvent::OfficerAssigned(OfficerAssigned {
                recipient: self.submitted_by,
                complaint: self.summary(),
                officer_id,
            }),
        ]
    }

    fn add_comment(
        &mut self,
        author: Uuid,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<Vec<ComplaintEvent>, ComplaintError> {
        if text.trim().is_empty() {
            return Err(ComplaintError::EmptyComment);
        }

        self.comments.push(Comment { author, text, created_at: now });

        // Citizen comments go to the officer (if any); everyone else's to the citizen.
        // An admin commenting on an unassigned complaint they did not submit still
        // reaches the citizen; a citizen commenting with no officer reaches nobody.
        let event = if author == self.submitted_by {
            self.assigned_to.map(|officer| CommentAdded {
                recipient: officer,
                complaint: self.summary(),
                audience: Audience::Officer,
                author,
            })
        } else {
            Some(CommentAdded {
                recipient: self.submitted_by,
                complaint: self.summary(),
                audience: Audience::Citizen,
                author,
            })
        };

        Ok(event.map(ComplaintEvent::CommentAdded).into_iter().collect())
    }

    fn update_details(&mut self, patch: ComplaintPatch) -> Result<(), ComplaintError> {
        // Validate everything before touching state
        let title = patch.title.as_deref().map(validate_title).transpose()?;
        let description = patch.description.as_deref().map(validate_description).transpose()?;
        let category = match patch.category.as_deref() {
            Some(raw) => Some(raw.parse::<Category>()?),
            None => None,
        };

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(category) = category {
            self.category = category;
            self.department = category.department();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(location) = patch.location {
            self.location = Some(location);
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = Some(image_url);
        }

        Ok(())
    }
}

fn validate_title(raw: &str) -> Result<String, ComplaintError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ComplaintError::EmptyTitle);
    }
    let len = title.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(ComplaintError::TitleTooLong { max: MAX_TITLE_LEN, actual: len });
    }
    Ok(title.to_string())
}

fn validate_description(raw: &str) -> Result<String, ComplaintError> {
    let description = raw.trim();
    if description.is_empty() {
        return Err(ComplaintError::EmptyDescription);
    }
    Ok(description.to_string())
}

/// Missing category falls back to `Other` (department General)
fn parse_category(raw: Option<&str>) -> Result<Category, ComplaintError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Category::Other),
        Some(raw) => raw.parse(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
