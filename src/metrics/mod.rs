// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

use crate::utils::CircuitState;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Covers:
// - Complaint intake and status transitions
// - Workflow operation outcomes and latency
// - Notification persistence and delivery failures
// - Push circuit breaker state
//
// All metrics live in one registry, scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // Complaint Metrics
    pub complaints_created: IntCounterVec,
    pub status_changes: IntCounterVec,

    // Workflow Metrics
    pub workflow_operations: IntCounterVec,
    pub workflow_duration: HistogramVec,

    // Notification Metrics
    pub notifications_persisted: IntCounterVec,
    pub notification_failures: IntCounterVec,
    pub push_circuit_state: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let complaints_created = IntCounterVec::new(
            Opts::new("complaints_created_total", "Complaints submitted"),
            &["category"],
        )?;
        registry.register(Box::new(complaints_created.clone()))?;

        let status_changes = IntCounterVec::new(
            Opts::new("complaint_status_changes_total", "Complaint status transitions"),
            &["from", "to"],
        )?;
        registry.register(Box::new(status_changes.clone()))?;

        let workflow_operations = IntCounterVec::new(
            Opts::new("workflow_operations_total", "Workflow operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(workflow_operations.clone()))?;

        let workflow_duration = HistogramVec::new(
            HistogramOpts::new("workflow_operation_duration_seconds", "Workflow operation duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(workflow_duration.clone()))?;

        let notifications_persisted = IntCounterVec::new(
            Opts::new("notifications_persisted_total", "Notifications written to the inbox store"),
            &["type"],
        )?;
        registry.register(Box::new(notifications_persisted.clone()))?;

        let notification_failures = IntCounterVec::new(
            Opts::new("notification_failures_total", "Absorbed notification failures"),
            &["type", "stage"],
        )?;
        registry.register(Box::new(notification_failures.clone()))?;

        let push_circuit_state = IntGauge::new(
            "push_circuit_state",
            "Push circuit breaker state (0=Closed, 1=HalfOpen, 2=Open)",
        )?;
        registry.register(Box::new(push_circuit_state.clone()))?;

        Ok(Self {
            registry,
            complaints_created,
            status_changes,
            workflow_operations,
            workflow_duration,
            notifications_persisted,
            notification_failures,
            push_circuit_state,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_operation(&self, operation: &str, outcome: &str, duration_secs: f64) {
        self.workflow_operations.with_label_values(&[operation, outcome]).inc();
        self.workflow_duration.with_label_values(&[operation]).observe(duration_secs);
    }

    pub fn record_complaint_created(&self, category: &str) {
        self.complaints_created.with_label_values(&[category]).inc();
    }

    pub fn record_status_change(&self, from: &str, to: &str) {
        self.status_changes.with_label_values(&[from, to]).inc();
    }

    pub fn record_notification_persisted(&self, kind: &str) {
        self.notifications_persisted.with_label_values(&[kind]).inc();
    }

    pub fn record_notification_failure(&self, kind: &str, stage: &str) {
        self.notification_failures.with_label_values(&[kind, stage]).inc();
    }

    pub fn update_push_circuit_state(&self, state: CircuitState) {
        self.push_circuit_state.set(state.as_gauge());
    }
}
