use std::sync::Arc;

use tms_portal::api::{ApiConfig, HttpApi};
use tms_portal::services::{
    AlwaysConfirm, BatchBoard, EnrollmentReconciler, ProvisioningCoordinator, UserHierarchyManager,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tms_portal=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = ApiConfig::new_from_env()?;
    let api = Arc::new(HttpApi::new(config)?);

    let mut provisioning = ProvisioningCoordinator::new(api.clone(), api.clone(), api.clone());
    provisioning.load_courses().await?;
    info!("loaded {} courses", provisioning.store().courses().len());

    let mut users = UserHierarchyManager::new(api.clone(), Arc::new(AlwaysConfirm));
    users.load_managers().await?;
    info!("loaded {} managers", users.managers().len());

    let mut dashboard = EnrollmentReconciler::new(api.clone(), api.clone());
    dashboard.load_dashboard().await?;
    if let Some(note) = dashboard.advisory() {
        info!("{}", note);
    }
    for batch in dashboard.batches() {
        info!("batch {}: {}", batch.batch_name, dashboard.status_for(batch.batch_id));
    }

    let board = BatchBoard::load(api.as_ref()).await?;
    info!(
        "{} active / {} inactive batches",
        board.active.len(),
        board.inactive.len()
    );

    Ok(())
}
