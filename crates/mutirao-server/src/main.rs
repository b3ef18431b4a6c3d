//! Mutirão Server — Application entry point.
//!
//! Connects to SurrealDB, applies pending migrations and keeps the
//! self-healing watchers for volunteers and roles running until the
//! process is interrupted.

use anyhow::Context;
use futures::StreamExt;
use mutirao_core::models::change::ChangeEvent;
use mutirao_core::repository::ChangeStream;
use mutirao_db::repository::{SurrealRoleRepository, SurrealVolunteerRepository};
use mutirao_db::{DbConfig, DbManager};
use mutirao_service::{watch_roles, watch_volunteers};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mutirao=info".parse()?))
        .json()
        .init();

    info!("Starting Mutirão server...");

    let config = DbConfig::from_env();
    let manager = DbManager::connect(&config)
        .await
        .context("failed to connect to SurrealDB")?;
    let db = manager.client().clone();

    mutirao_db::run_migrations(&db)
        .await
        .context("failed to apply migrations")?;

    let volunteers = SurrealVolunteerRepository::new(db.clone());
    let roles = SurrealRoleRepository::new(db);

    let volunteer_watch = tokio::spawn(drain(
        "volunteer",
        watch_volunteers(&volunteers).await?,
    ));
    let role_watch = tokio::spawn(drain("role", watch_roles(&roles).await?));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    volunteer_watch.abort();
    role_watch.abort();

    info!("Mutirão server stopped.");
    Ok(())
}

/// Consume a change stream, logging every event until it closes.
async fn drain<T: Send + 'static>(entity: &'static str, mut stream: ChangeStream<T>) {
    while let Some(item) = stream.next().await {
        match item {
            Ok(ChangeEvent { kind, key, .. }) => {
                info!(entity, key = %key, kind = ?kind, "Change observed");
            }
            Err(e) => error!(entity, error = %e, "Change stream error"),
        }
    }
    info!(entity, "Change stream closed");
}
