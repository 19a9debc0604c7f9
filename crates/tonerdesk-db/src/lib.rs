//! # TonerDesk DB
//!
//! PostgreSQL pool initialization and the embedded schema migrations.
//!
//! # Example
//!
//! ```ignore
//! use tonerdesk_config::DatabaseConfig;
//! use tonerdesk_db::{init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//!     run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

use sqlx::postgres::PgPoolOptions;
use tonerdesk_config::DatabaseConfig;
use tracing::info;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Migrations shared with `#[sqlx::test(migrations = "./migrations")]`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Opens a PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable and should be created once at
/// startup and handed to application state.
///
/// # Errors
///
/// Returns the underlying [`sqlx::Error`] when the database is unreachable.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies any pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
