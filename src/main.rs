use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use civic_complaints::domain::complaint::NewComplaint;
use civic_complaints::domain::notification::ListOptions;
use civic_complaints::domain::user::{Role, User};
use civic_complaints::metrics::{self, Metrics};
use civic_complaints::push::LoggingPushHook;
use civic_complaints::store::{
    InMemoryComplaintStore, InMemoryDeviceRegistry, InMemoryNotificationStore, InMemoryUserDirectory,
};
use civic_complaints::{AppConfig, ComplaintService, ServiceDeps};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development)
    let _ = dotenvy::dotenv();

    // Default to INFO, override with RUST_LOG
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,civic_complaints=debug")),
        )
        .init();

    tracing::info!("🚀 Starting civic complaints service");

    let config = AppConfig::from_env()?;
    tracing::info!(?config, "Configuration loaded");

    // === 1. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("📊 Metrics registry created with {} metrics", metrics.registry().gather().len());

    // actix-web needs its own system; keep it off the tokio runtime
    let registry = metrics.registry().clone();
    let port = config.metrics_port;
    std::thread::spawn(move || {
        let result = actix_web::rt::System::new().block_on(metrics::start_metrics_server(registry, port));
        if let Err(e) = result {
            tracing::error!("Metrics server error: {}", e);
        }
    });

    // === 2. Stores and directory ===
    let now = Utc::now();
    let citizen = User::new("Asha Rao", "asha@example.com", Role::Citizen);
    let officer = User::new("Ravi Kumar", "ravi@city.gov", Role::Officer).with_created_at(now - Duration::days(365));
    let backup = User::new("Neha Singh", "neha@city.gov", Role::Officer).with_created_at(now - Duration::days(30));
    let admin = User::new("Meera Iyer", "meera@city.gov", Role::Admin);

    let complaints = Arc::new(InMemoryComplaintStore::new());
    let users = Arc::new(InMemoryUserDirectory::with_users([
        citizen.clone(),
        officer.clone(),
        backup.clone(),
        admin.clone(),
    ]));
    let notifications = Arc::new(InMemoryNotificationStore::new());

    // === 3. Service ===
    let service = ComplaintService::from_config(
        &config,
        ServiceDeps {
            complaints,
            users,
            notifications,
            devices: Arc::new(InMemoryDeviceRegistry::new()),
            push: Arc::new(LoggingPushHook),
            metrics: metrics.clone(),
        },
    );

    // === 4. Walk one complaint through its lifecycle ===
    let device = service
        .register_device(citizen.id, "demo-device-token", Some("android"))
        .await?;
    tracing::info!(platform = %device.platform, "Citizen device registered");

    let complaint = service
        .create_complaint(
            NewComplaint {
                title: "Water main leaking".to_string(),
                description: "Clean water running down Station Road since morning".to_string(),
                category: Some("Water".to_string()),
                ..Default::default()
            },
            citizen.id,
        )
        .await?;
    tracing::info!(human_id = %complaint.human_id, department = %complaint.department, "Demo complaint created");

    let assigned_to = complaint.assigned_to.unwrap_or(officer.id);
    service
        .update_status(complaint.id, "In Progress", assigned_to, Some("Crew dispatched".to_string()))
        .await?;
    service
        .add_comment(complaint.id, citizen.id, "The leak is getting worse near the bus stop")
        .await?;
    service
        .assign_officer(complaint.id, backup.id, admin.id)
        .await?;
    let resolved = service
        .update_status(complaint.id, "Resolved", backup.id, Some("Pipe joint replaced".to_string()))
        .await?;
    tracing::info!(
        status = %resolved.status,
        history = resolved.status_history.len(),
        "Demo complaint resolved"
    );

    let inbox = service.list_notifications(citizen.id, ListOptions::default()).await?;
    for notification in &inbox.notifications {
        tracing::info!(kind = notification.kind.as_str(), title = %notification.title, "{}", notification.message);
    }
    let marked = service.mark_all_read(citizen.id).await?;
    tracing::info!(marked, unread = service.unread_count(citizen.id).await?, "Citizen inbox cleared");

    let stats = service.complaint_stats().await?;
    tracing::info!(
        total = stats.total,
        pending = stats.pending,
        in_progress = stats.in_progress,
        resolved = stats.resolved,
        "Complaint stats"
    );

    tracing::info!("✅ Demo complete, metrics on http://0.0.0.0:{}/metrics (Ctrl+C to exit)", port);
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    Ok(())
}
