use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::complaint::ComplaintStatus;
use crate::domain::user::User;
use crate::store::{ComplaintFilter, ComplaintStore, StorageResult};

// ============================================================================
// Officer Routing Policies
// ============================================================================
//
// Routing is advisory: a None result leaves the complaint unassigned and the
// roster is read without any locking, so two concurrent submissions may land
// on the same officer.
//
// ============================================================================

#[async_trait]
pub trait RoutingPolicy: Send + Sync {
    /// Pick an officer from `roster` (ordered by account creation, oldest first)
    async fn select(&self, roster: &[User]) -> StorageResult<Option<Uuid>>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingStrategy {
    #[default]
    EarliestActive,
    LeastLoaded,
}

impl FromStr for RoutingStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "earliest" | "earliest_active" => Ok(RoutingStrategy::EarliestActive),
            "least_loaded" | "least-loaded" => Ok(RoutingStrategy::LeastLoaded),
            other => anyhow::bail!("Unknown routing strategy: {}", other),
        }
    }
}

impl RoutingStrategy {
    pub fn build(self, complaints: Arc<dyn ComplaintStore>) -> Arc<dyn RoutingPolicy> {
        match self {
            RoutingStrategy::EarliestActive => Arc::new(EarliestActiveOfficer),
            RoutingStrategy::LeastLoaded => Arc::new(LeastLoadedOfficer::new(complaints)),
        }
    }
}

/// Oldest active officer account wins. Ignores workload.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarliestActiveOfficer;

#[async_trait]
impl RoutingPolicy for EarliestActiveOfficer {
    async fn select(&self, roster: &[User]) -> StorageResult<Option<Uuid>> {
        Ok(roster
            .iter()
            .filter(|u| u.is_officer() && u.is_active)
            .min_by_key(|u| u.created_at)
            .map(|u| u.id))
    }

    fn name(&self) -> &'static str {
        "earliest_active"
    }
}

/// Fewest open (Pending / In Progress) complaints wins; ties go to the
/// older account.
pub struct LeastLoadedOfficer {
    complaints: Arc<dyn ComplaintStore>,
}

impl LeastLoadedOfficer {
    pub fn new(complaints: Arc<dyn ComplaintStore>) -> Self {
        Self { complaints }
    }

    async fn open_load(&self, officer: Uuid) -> StorageResult<usize> {
        let mut load = 0;
        for status in ComplaintStatus::OPEN {
            let filter = ComplaintFilter::assigned_to(officer).with_status(status);
            load += self.complaints.count_complaints(&filter).await?;
        }
        Ok(load)
    }
}

#[async_trait]
impl RoutingPolicy for LeastLoadedOfficer {
    async fn select(&self, roster: &[User]) -> StorageResult<Option<Uuid>> {
        let mut best: Option<(usize, &User)> = None;

        for officer in roster.iter().filter(|u| u.is_officer() && u.is_active) {
            let load = self.open_load(officer.id).await?;
            let better = match best {
                None => true,
                Some((best_load, best_user)) => {
                    load < best_load || (load == best_load && officer.created_at < best_user.created_at)
                }
            };
            if better {
                best = Some((load, officer));
            }
        }

        if let Some((load, officer)) = best {
            tracing::debug!(officer_id = %officer.id, open_complaints = load, "Least loaded officer selected");
        }

        Ok(best.map(|(_, officer)| officer.id))
    }

    fn name(&self) -> &'static str {
        "least_loaded"
    }
}
