//! # TonerDesk Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`database`]: PostgreSQL connection settings
//! - [`jwt`]: access-token verification settings
//! - [`server`]: listen address
//! - [`cors`]: allowed browser origins
//!
//! # Example
//!
//! ```ignore
//! use tonerdesk_config::{CorsConfig, DatabaseConfig, JwtConfig, ServerConfig};
//!
//! dotenvy::dotenv().ok();
//! let database = DatabaseConfig::from_env()?;
//! let jwt = JwtConfig::from_env();
//! let server = ServerConfig::from_env();
//! let cors = CorsConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod jwt;
pub mod server;

use std::env;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Reads `key` and parses it, falling back to `default` when unset or invalid.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}
