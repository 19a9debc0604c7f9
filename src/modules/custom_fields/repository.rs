//! Persistence seam for custom fields.
//!
//! [`CustomFieldStore`](super::service::CustomFieldStore) only talks to a
//! [`CustomFieldRepository`], so its semantics can be exercised against
//! [`InMemoryCustomFieldRepository`](super::memory::InMemoryCustomFieldRepository)
//! as well as Postgres.

use std::future::Future;

use sqlx::PgPool;
use tracing::instrument;

use tonerdesk_models::custom_fields::{CustomField, CustomFieldValue, SluggedValue};
use tonerdesk_models::ids::{CustomFieldId, EntityId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub trait CustomFieldRepository: Send + Sync {
    /// Definition of `slug` for one entity type, if any.
    fn find_field_definition(
        &self,
        entity_type: &str,
        slug: &str,
    ) -> impl Future<Output = Result<Option<CustomField>, StoreError>> + Send;

    fn find_value(
        &self,
        field_id: CustomFieldId,
        entity_type: &str,
        entity_id: EntityId,
    ) -> impl Future<Output = Result<Option<CustomFieldValue>, StoreError>> + Send;

    /// Inserts or overwrites the single row keyed by
    /// `(field_id, entity_type, entity_id)`.
    fn upsert_value(
        &self,
        field_id: CustomFieldId,
        entity_type: &str,
        entity_id: EntityId,
        value: Option<String>,
    ) -> impl Future<Output = Result<CustomFieldValue, StoreError>> + Send;

    fn list_values_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> impl Future<Output = Result<Vec<CustomFieldValue>, StoreError>> + Send;

    /// Stored values of one entity joined with their definition's slug.
    fn list_slugged_values_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> impl Future<Output = Result<Vec<SluggedValue>, StoreError>> + Send;
}

#[derive(Debug, Clone)]
pub struct PgCustomFieldRepository {
    db: PgPool,
}

impl PgCustomFieldRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl CustomFieldRepository for PgCustomFieldRepository {
    #[instrument(skip(self))]
    async fn find_field_definition(
        &self,
        entity_type: &str,
        slug: &str,
    ) -> Result<Option<CustomField>, StoreError> {
        let field = sqlx::query_as::<_, CustomField>(
            r#"SELECT id, entity_type, name, slug, field_type, options, is_required, "order",
                      help_text, is_active, show_in_table, table_order, show_in_creation_wizard,
                      created_at, updated_at
               FROM custom_fields
               WHERE entity_type = $1 AND slug = $2
               ORDER BY id
               LIMIT 1"#,
        )
        .bind(entity_type)
        .bind(slug)
        .fetch_optional(&self.db)
        .await?;

        Ok(field)
    }

    #[instrument(skip(self))]
    async fn find_value(
        &self,
        field_id: CustomFieldId,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Option<CustomFieldValue>, StoreError> {
        let value = sqlx::query_as::<_, CustomFieldValue>(
            r#"SELECT id, custom_field_id, entity_type, entity_id, value, created_at, updated_at
               FROM custom_field_values
               WHERE custom_field_id = $1 AND entity_type = $2 AND entity_id = $3"#,
        )
        .bind(field_id)
        .bind(entity_type)
        .bind(entity_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(value)
    }

    #[instrument(skip(self, value))]
    async fn upsert_value(
        &self,
        field_id: CustomFieldId,
        entity_type: &str,
        entity_id: EntityId,
        value: Option<String>,
    ) -> Result<CustomFieldValue, StoreError> {
        let row = sqlx::query_as::<_, CustomFieldValue>(
            r#"INSERT INTO custom_field_values (custom_field_id, entity_type, entity_id, value)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (custom_field_id, entity_type, entity_id)
               DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
               RETURNING id, custom_field_id, entity_type, entity_id, value, created_at, updated_at"#,
        )
        .bind(field_id)
        .bind(entity_type)
        .bind(entity_id)
        .bind(value)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(self))]
    async fn list_values_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Vec<CustomFieldValue>, StoreError> {
        let values = sqlx::query_as::<_, CustomFieldValue>(
            r#"SELECT id, custom_field_id, entity_type, entity_id, value, created_at, updated_at
               FROM custom_field_values
               WHERE entity_type = $1 AND entity_id = $2
               ORDER BY id"#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.db)
        .await?;

        Ok(values)
    }

    #[instrument(skip(self))]
    async fn list_slugged_values_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Vec<SluggedValue>, StoreError> {
        let values = sqlx::query_as::<_, SluggedValue>(
            r#"SELECT f.slug, v.value
               FROM custom_field_values v
               JOIN custom_fields f ON f.id = v.custom_field_id
               WHERE v.entity_type = $1 AND v.entity_id = $2
               ORDER BY f."order", f.id"#,
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&self.db)
        .await?;

        Ok(values)
    }
}
