use anyhow::Result;
use tracing::{debug, info};

use super::initdb::run_migrations;
use super::serve::run_server;
use crate::config::{build_app_state, Settings};
use crate::router::create_router;

pub async fn migrate_and_serve(settings: &Settings) -> Result<()> {
    info!("Applying database migrations and starting server");
    debug!("Bind address: {}", settings.bind_address);

    // Reuse the migrated connection for serving
    let db = run_migrations(&settings.database_url).await?;
    let state = build_app_state(db, settings);
    debug!("Application state initialized successfully");

    run_server(create_router(state), &settings.bind_address).await
}
