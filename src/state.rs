use sqlx::PgPool;

use tonerdesk_config::{CorsConfig, JwtConfig};

use crate::modules::custom_fields::{CustomFieldStore, PgCustomFieldRepository};

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(db: PgPool, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            db,
            jwt_config,
            cors_config,
        }
    }

    pub fn from_env(db: PgPool) -> Self {
        Self::new(db, JwtConfig::from_env(), CorsConfig::from_env())
    }

    /// Postgres-backed value store sharing this state's pool.
    pub fn custom_fields(&self) -> CustomFieldStore<PgCustomFieldRepository> {
        CustomFieldStore::new(PgCustomFieldRepository::new(self.db.clone()))
    }
}
