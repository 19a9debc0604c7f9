use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use tonerdesk::router::init_router;
use tonerdesk::state::AppState;
use tonerdesk_config::{DatabaseConfig, ServerConfig};
use tonerdesk_db::{init_db_pool, run_migrations};
use tonerdesk_observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _log_guards = init_tracing();

    let database_config = DatabaseConfig::from_env()?;
    let db = init_db_pool(&database_config)
        .await
        .context("Failed to connect to database")?;
    run_migrations(&db)
        .await
        .context("Failed to run database migrations")?;

    let state = AppState::from_env(db);
    let app = init_router(state);

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!(address = %address, "Server running");
    info!("OpenAPI document at http://{}/api-docs/openapi.json", address);

    axum::serve(listener, app).await?;
    Ok(())
}
