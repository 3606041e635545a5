use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::{ComplaintStatus, Location, Priority};

// ============================================================================
// Complaint Commands - Represent user intent
// ============================================================================

/// Citizen submission as received from the controller.
///
/// `category` stays a raw string until the workflow parses it: a missing
/// category falls back to `Other`, an unrecognised one is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Editable complaint details. Identity, ownership and status are not patchable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplaintPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub location: Option<Location>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ComplaintCommand {
    ChangeStatus {
        status: ComplaintStatus,
        changed_by: Uuid,
        notes: Option<String>,
    },
    AssignOfficer {
        officer_id: Uuid,
        officer_name: String,
    },
    AddComment {
        author: Uuid,
        text: String,
    },
    UpdateDetails(ComplaintPatch),
}
