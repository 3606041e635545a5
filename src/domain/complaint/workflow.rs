use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StorageError, WorkflowError};
use crate::events::EventEnvelope;
use crate::routing::RoutingPolicy;
use crate::store::{ComplaintFilter, ComplaintStore, OfficerFilter, UserDirectory};

use super::aggregate::Complaint;
use super::commands::{ComplaintCommand, ComplaintPatch, NewComplaint};
use super::errors::ComplaintError;
use super::events::ComplaintEvent;
use super::value_objects::{ComplaintStatus, HumanId};

// ============================================================================
// Complaint Workflow
// ============================================================================
//
// Orchestrates: Load → Aggregate → Save (version checked) → Event Envelopes
//
// Nothing here sends notifications. Every mutating operation hands its events
// back to the caller, which decides how to dispatch them.
//
// ============================================================================

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// How many random human ids to try before giving up
    pub human_id_attempts: u32,
    /// Page size used when a list request asks for 0
    pub complaint_page_limit: usize,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            human_id_attempts: 5,
            complaint_page_limit: ComplaintFilter::DEFAULT_LIMIT,
        }
    }
}

/// Result of a mutating operation plus the events it emitted, in order
#[derive(Debug, Clone)]
pub struct WorkflowOutcome<T> {
    pub value: T,
    pub events: Vec<EventEnvelope<ComplaintEvent>>,
}

impl<T> WorkflowOutcome<T> {
    pub fn into_parts(self) -> (T, Vec<EventEnvelope<ComplaintEvent>>) {
        (self.value, self.events)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintPage {
    pub complaints: Vec<Complaint>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

impl ComplaintPage {
    pub fn total_pages(&self) -> usize {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }
}

/// Dashboard counts by status; `total` also includes Rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub rejected: usize,
}

pub struct ComplaintWorkflow {
    complaints: Arc<dyn ComplaintStore>,
    users: Arc<dyn UserDirectory>,
    routing: Arc<dyn RoutingPolicy>,
    config: WorkflowConfig,
}

impl ComplaintWorkflow {
    pub fn new(
        complaints: Arc<dyn ComplaintStore>,
        users: Arc<dyn UserDirectory>,
        routing: Arc<dyn RoutingPolicy>,
        config: WorkflowConfig,
    ) -> Self {
        Self { complaints, users, routing, config }
    }

    /// Submit a new complaint, routing it to an officer when one is available
    pub async fn create(
        &self,
        input: NewComplaint,
        submitted_by: Uuid,
    ) -> WorkflowResult<WorkflowOutcome<Complaint>> {
        let roster = self.users.find_officers(OfficerFilter { active_only: true }).await?;
        let routed_to = self.routing.select(&roster).await?;

        let attempts = self.config.human_id_attempts.max(1);
        for attempt in 1..=attempts {
            let now = Utc::now();
            let human_id = random_human_id(now);

            if self.complaints.find_complaint_by_human_id(&human_id).await?.is_some() {
                tracing::debug!(human_id = %human_id, attempt, "Human id already taken, retrying");
                continue;
            }

            let (mut complaint, events) =
                Complaint::submit(human_id, input.clone(), submitted_by, routed_to, now)?;

            match self.complaints.save_complaint(&complaint).await {
                Ok(version) => complaint.version = version,
                // Lost a race for the same id between lookup and insert
                Err(StorageError::DuplicateHumanId(taken)) => {
                    tracing::debug!(human_id = %taken, attempt, "Human id claimed concurrently, retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }

            tracing::info!(
                complaint_id = %complaint.id,
                human_id = %complaint.human_id,
                category = %complaint.category,
                assigned_to = ?complaint.assigned_to,
                routing = self.routing.name(),
                "Complaint submitted"
            );

            let events = EventEnvelope::wrap_all(complaint.id, submitted_by, events);
            return Ok(WorkflowOutcome { value: complaint, events });
        }

        tracing::error!(attempts, "Could not allocate a free complaint id");
        Err(StorageError::HumanIdExhausted(attempts).into())
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
        actor: Uuid,
        notes: Option<String>,
    ) -> WorkflowResult<WorkflowOutcome<Complaint>> {
        let complaint = self.load(id).await?;
        let status: ComplaintStatus = status.parse()?;
        let old_status = complaint.status;

        let outcome = self
            .apply(complaint, actor, ComplaintCommand::ChangeStatus { status, changed_by: actor, notes })
            .await?;

        tracing::info!(
            complaint_id = %id,
            from = %old_status,
            to = %status,
            actor = %actor,
            "Complaint status changed"
        );
        Ok(outcome)
    }

    pub async fn assign_officer(
        &self,
        id: Uuid,
        officer_id: Uuid,
        actor: Uuid,
    ) -> WorkflowResult<WorkflowOutcome<Complaint>> {
        let complaint = self.load(id).await?;

        let officer = self
            .users
            .find_user_by_id(officer_id)
            .await?
            .filter(|u| u.is_officer())
            .ok_or(ComplaintError::InvalidOfficer(officer_id))?;

        let outcome = self
            .apply(
                complaint,
                actor,
                ComplaintCommand::AssignOfficer { officer_id, officer_name: officer.name },
            )
            .await?;

        tracing::info!(complaint_id = %id, officer_id = %officer_id, actor = %actor, "Officer assigned");
        Ok(outcome)
    }

    pub async fn add_comment(
        &self,
        id: Uuid,
        author: Uuid,
        text: String,
    ) -> WorkflowResult<WorkflowOutcome<Complaint>> {
        let complaint = self.load(id).await?;
        let outcome = self
            .apply(complaint, author, ComplaintCommand::AddComment { author, text })
            .await?;

        tracing::info!(complaint_id = %id, author = %author, "Comment added");
        Ok(outcome)
    }

    /// Edit descriptive fields. Emits no events.
    pub async fn update_details(
        &self,
        id: Uuid,
        patch: ComplaintPatch,
        actor: Uuid,
    ) -> WorkflowResult<WorkflowOutcome<Complaint>> {
        let complaint = self.load(id).await?;
        let outcome = self
            .apply(complaint, actor, ComplaintCommand::UpdateDetails(patch))
            .await?;

        tracing::info!(complaint_id = %id, actor = %actor, "Complaint details updated");
        Ok(outcome)
    }

    /// Hard delete; notifications that reference the complaint are kept
    pub async fn delete(&self, id: Uuid) -> WorkflowResult<()> {
        if !self.complaints.delete_complaint_by_id(id).await? {
            return Err(WorkflowError::complaint_not_found(id));
        }
        tracing::info!(complaint_id = %id, "Complaint deleted");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> WorkflowResult<Complaint> {
        self.load(id).await
    }

    pub async fn get_by_human_id(&self, human_id: &str) -> WorkflowResult<Complaint> {
        let parsed = HumanId::parse(human_id)
            .ok_or_else(|| WorkflowError::complaint_not_found(human_id))?;
        self.complaints
            .find_complaint_by_human_id(&parsed)
            .await?
            .ok_or_else(|| WorkflowError::complaint_not_found(human_id))
    }

    pub async fn list(&self, mut filter: ComplaintFilter) -> WorkflowResult<ComplaintPage> {
        filter.page = filter.page.max(1);
        if filter.limit == 0 {
            filter.limit = self.config.complaint_page_limit;
        }

        let complaints = self.complaints.find_complaints(&filter).await?;
        let total = self.complaints.count_complaints(&filter).await?;

        Ok(ComplaintPage { complaints, total, page: filter.page, limit: filter.limit })
    }

    pub async fn stats(&self) -> WorkflowResult<ComplaintStats> {
        let count = |status: Option<ComplaintStatus>| {
            let filter = ComplaintFilter { status, ..ComplaintFilter::default() };
            async move { self.complaints.count_complaints(&filter).await }
        };

        Ok(ComplaintStats {
            total: count(None).await?,
            pending: count(Some(ComplaintStatus::Pending)).await?,
            in_progress: count(Some(ComplaintStatus::InProgress)).await?,
            resolved: count(Some(ComplaintStatus::Resolved)).await?,
            rejected: count(Some(ComplaintStatus::Rejected)).await?,
        })
    }

    async fn load(&self, id: Uuid) -> WorkflowResult<Complaint> {
        self.complaints
            .find_complaint_by_id(id)
            .await?
            .ok_or_else(|| WorkflowError::complaint_not_found(id))
    }

    async fn apply(
        &self,
        mut complaint: Complaint,
        actor: Uuid,
        command: ComplaintCommand,
    ) -> WorkflowResult<WorkflowOutcome<Complaint>> {
        let events = complaint.execute(command, Utc::now())?;
        complaint.version = self.complaints.save_complaint(&complaint).await?;

        let events = EventEnvelope::wrap_all(complaint.id, actor, events);
        Ok(WorkflowOutcome { value: complaint, events })
    }
}

fn random_human_id(now: DateTime<Utc>) -> HumanId {
    let suffix = rand::thread_rng().gen_range(10_000..=99_999);
    HumanId::new(now.date_naive(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::complaint::{Category, Department};
    use crate::domain::user::{Role, User};
    use crate::routing::EarliestActiveOfficer;
    use crate::store::{InMemoryComplaintStore, InMemoryUserDirectory};

    struct Fixture {
        workflow: ComplaintWorkflow,
        store: Arc<InMemoryComplaintStore>,
        citizen: User,
        officer: User,
        admin: User,
    }

    fn fixture_with(officers: bool) -> Fixture {
        let citizen = User::new("Asha", "asha@example.com", Role::Citizen);
        let officer = User::new("Ravi", "ravi@city.gov", Role::Officer);
        let admin = User::new("Meera", "meera@city.gov", Role::Admin);

        let mut users = vec![citizen.clone(), admin.clone()];
        if officers {
            users.push(officer.clone());
        }

        let store = Arc::new(InMemoryComplaintStore::new());
        let workflow = ComplaintWorkflow::new(
            store.clone(),
            Arc::new(InMemoryUserDirectory::with_users(users)),
            Arc::new(EarliestActiveOfficer),
            WorkflowConfig::default(),
        );

        Fixture { workflow, store, citizen, officer, admin }
    }

    fn water_leak() -> NewComplaint {
        NewComplaint {
            title: "Burst pipe".to_string(),
            description: "Water flooding the street".to_string(),
            category: Some("Water".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_routes_and_emits_events() {
        let fx = fixture_with(true);

        let outcome = fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap();
        let complaint = &outcome.value;

        assert_eq!(complaint.department, Department::WaterSupply);
        assert_eq!(complaint.assigned_to, Some(fx.officer.id));
        assert_eq!(complaint.status_history.len(), 1);
        assert_eq!(complaint.version, 1);
        assert_eq!(complaint.human_id.date(), Some(Utc::now().date_naive()));

        let types: Vec<&str> = outcome.events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["ComplaintSubmitted", "ComplaintAssigned"]);
        assert_eq!(outcome.events[0].event_data.recipient(), fx.citizen.id);
        assert_eq!(outcome.events[1].event_data.recipient(), fx.officer.id);
    }

    #[tokio::test]
    async fn test_create_without_officers_leaves_unassigned() {
        let fx = fixture_with(false);

        let outcome = fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap();

        assert!(outcome.value.assigned_to.is_none());
        assert_eq!(outcome.events.len(), 1);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_category() {
        let fx = fixture_with(true);
        let input = NewComplaint { category: Some("Parks".to_string()), ..water_leak() };

        let err = fx.workflow.create(input, fx.citizen.id).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
        assert_eq!(fx.store.count_complaints(&ComplaintFilter::default()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_zero_attempt_budget_still_tries_once() {
        let fx = fixture_with(true);
        let workflow = ComplaintWorkflow {
            config: WorkflowConfig { human_id_attempts: 0, ..WorkflowConfig::default() },
            ..fx.workflow
        };

        // A zero budget still makes one attempt
        assert!(workflow.create(water_leak(), fx.citizen.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_status_unknown_status_is_validation() {
        let fx = fixture_with(true);
        let created = fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap().value;

        let err = fx
            .workflow
            .update_status(created.id, "Closed", fx.officer.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(ComplaintError::UnknownStatus(_))));
    }

    #[tokio::test]
    async fn test_update_status_missing_complaint() {
        let fx = fixture_with(true);
        let err = fx
            .workflow
            .update_status(Uuid::new_v4(), "Resolved", fx.officer.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn test_resolve_by_assignee_skips_officer_event() {
        let fx = fixture_with(true);
        let created = fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap().value;

        let outcome = fx
            .workflow
            .update_status(created.id, "Resolved", fx.officer.id, Some("fixed".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.value.status, ComplaintStatus::Resolved);
        assert_eq!(outcome.value.resolution_notes.as_deref(), Some("fixed"));
        assert!(outcome.value.resolved_at.is_some());
        assert_eq!(outcome.value.version, 2);

        assert_eq!(outcome.events.len(), 2);
        assert!(outcome.events.iter().all(|e| e.event_data.recipient() == fx.citizen.id));
        assert!(outcome.events.iter().all(|e| e.actor_id == Some(fx.officer.id)));
    }

    #[tokio::test]
    async fn test_assign_officer_validates_role() {
        let fx = fixture_with(true);
        let created = fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap().value;

        let err = fx
            .workflow
            .assign_officer(created.id, fx.citizen.id, fx.admin.id)
            .await
            .unwrap_err();
        assert_eq!(err, WorkflowError::Validation(ComplaintError::InvalidOfficer(fx.citizen.id)));

        let err = fx
            .workflow
            .assign_officer(created.id, Uuid::new_v4(), fx.admin.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "validation");
    }

    #[tokio::test]
    async fn test_assign_officer_records_history() {
        let fx = fixture_with(false);
        let created = fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap().value;

        let officer = User::new("Kiran", "kiran@city.gov", Role::Officer);
        let workflow = ComplaintWorkflow::new(
            fx.store.clone(),
            Arc::new(InMemoryUserDirectory::with_users([officer.clone()])),
            Arc::new(EarliestActiveOfficer),
            WorkflowConfig::default(),
        );

        let outcome = workflow.assign_officer(created.id, officer.id, fx.admin.id).await.unwrap();
        let last = outcome.value.status_history.last().unwrap();

        assert_eq!(outcome.value.assigned_to, Some(officer.id));
        assert_eq!(last.status, ComplaintStatus::Pending);
        assert_eq!(last.changed_by, officer.id);
        assert_eq!(last.notes.as_deref(), Some("Complaint assigned to officer: Kiran"));
        assert_eq!(outcome.events[0].event_type, "ComplaintAssigned");
        assert_eq!(outcome.events[1].event_type, "OfficerAssigned");
    }

    #[tokio::test]
    async fn test_update_details_rederives_department() {
        let fx = fixture_with(true);
        let created = fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap().value;

        let patch = ComplaintPatch { category: Some("Road".to_string()), ..Default::default() };
        let outcome = fx.workflow.update_details(created.id, patch, fx.admin.id).await.unwrap();

        assert_eq!(outcome.value.category, Category::Road);
        assert_eq!(outcome.value.department, Department::PublicWorks);
        assert_eq!(outcome.value.status_history.len(), 1);
        assert!(outcome.events.is_empty());
    }

    #[tokio::test]
    async fn test_stale_copy_is_rejected() {
        let fx = fixture_with(true);
        let created = fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap().value;

        let mut stale = created.clone();
        fx.workflow
            .add_comment(created.id, fx.citizen.id, "Any update?".to_string())
            .await
            .unwrap();

        stale.title = "Edited elsewhere".to_string();
        let err = fx.store.save_complaint(&stale).await.unwrap_err();
        assert!(matches!(err, StorageError::VersionConflict { expected: 1, actual: 2, .. }));
    }

    #[tokio::test]
    async fn test_get_delete_and_lookup() {
        let fx = fixture_with(true);
        let created = fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap().value;

        let by_human = fx.workflow.get_by_human_id(created.human_id.as_str()).await.unwrap();
        assert_eq!(by_human.id, created.id);
        assert_eq!(fx.workflow.get_by_human_id("COMP-bogus").await.unwrap_err().kind(), "not_found");

        fx.workflow.delete(created.id).await.unwrap();
        assert_eq!(fx.workflow.get(created.id).await.unwrap_err().kind(), "not_found");
        assert_eq!(fx.workflow.delete(created.id).await.unwrap_err().kind(), "not_found");
    }

    #[tokio::test]
    async fn test_list_filters_and_paginates() {
        let fx = fixture_with(true);
        for _ in 0..3 {
            fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap();
        }
        let road = NewComplaint { category: Some("Road".to_string()), ..water_leak() };
        fx.workflow.create(road, fx.admin.id).await.unwrap();

        let page = fx
            .workflow
            .list(ComplaintFilter { submitted_by: Some(fx.citizen.id), limit: 2, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.complaints.len(), 2);
        assert_eq!(page.total_pages(), 2);

        let page = fx
            .workflow
            .list(ComplaintFilter { category: Some(Category::Road), page: 0, limit: 0, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, ComplaintFilter::DEFAULT_LIMIT);
    }
    #[tokio::test]
    async fn test_list_far_past_the_end_is_empty() {
        let fx = fixture_with(true);
        fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap();

        let page = fx
            .workflow
            .list(ComplaintFilter { page: usize::MAX, ..Default::default() })
            .await
            .unwrap();

        assert!(page.complaints.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.page, usize::MAX);
    }
    #[tokio::test]
    async fn test_stats_count_by_status() {
        let fx = fixture_with(true);
        assert_eq!(fx.workflow.stats().await.unwrap(), ComplaintStats::default());

        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(fx.workflow.create(water_leak(), fx.citizen.id).await.unwrap().value.id);
        }
        fx.workflow.update_status(ids[0], "In Progress", fx.officer.id, None).await.unwrap();
        fx.workflow.update_status(ids[1], "Resolved", fx.officer.id, None).await.unwrap();
        fx.workflow.update_status(ids[2], "Rejected", fx.admin.id, None).await.unwrap();

        let stats = fx.workflow.stats().await.unwrap();
        assert_eq!(
            stats,
            ComplaintStats { total: 4, pending: 1, in_progress: 1, resolved: 1, rejected: 1 }
        );

        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["inProgress"], 1);
    }
}
