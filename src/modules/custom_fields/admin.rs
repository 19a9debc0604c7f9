use anyhow::anyhow;
use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;

use tonerdesk_core::AppError;
use tonerdesk_models::custom_fields::{
    CreateCustomFieldDto, CustomField, CustomFieldFilterParams, FieldType, UpdateCustomFieldDto,
    generate_slug,
};
use tonerdesk_models::ids::CustomFieldId;

const DUPLICATE_FIELD: &str = "A field with this name already exists for this entity";

/// Definition management for administrators.
pub struct CustomFieldAdmin;

impl CustomFieldAdmin {
    #[instrument(skip(db))]
    pub async fn list(
        db: &PgPool,
        filters: CustomFieldFilterParams,
    ) -> Result<Vec<CustomField>, AppError> {
        let entity_type = filters.entity_type.filter(|t| !t.trim().is_empty());

        let fields = sqlx::query_as::<_, CustomField>(
            r#"SELECT id, entity_type, name, slug, field_type, options, is_required, "order",
                      help_text, is_active, show_in_table, table_order, show_in_creation_wizard,
                      created_at, updated_at
               FROM custom_fields
               WHERE ($1::TEXT IS NULL OR entity_type = $1)
               ORDER BY entity_type, "order", id"#,
        )
        .bind(entity_type)
        .fetch_all(db)
        .await?;

        Ok(fields)
    }

    #[instrument(skip(db))]
    pub async fn create(db: &PgPool, dto: CreateCustomFieldDto) -> Result<CustomField, AppError> {
        let slug = generate_slug(&dto.name);
        if slug.is_empty() {
            return Err(AppError::unprocessable(anyhow!(
                "Name must contain at least one letter or digit"
            )));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM custom_fields WHERE entity_type = $1 AND slug = $2)",
        )
        .bind(&dto.entity_type)
        .bind(&slug)
        .fetch_one(db)
        .await?;

        if exists {
            return Err(AppError::unprocessable(anyhow!(DUPLICATE_FIELD)));
        }

        let field = sqlx::query_as::<_, CustomField>(
            r#"INSERT INTO custom_fields
                   (entity_type, name, slug, field_type, options, is_required, "order", help_text,
                    show_in_table, table_order, show_in_creation_wizard)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
               RETURNING id, entity_type, name, slug, field_type, options, is_required, "order",
                         help_text, is_active, show_in_table, table_order,
                         show_in_creation_wizard, created_at, updated_at"#,
        )
        .bind(&dto.entity_type)
        .bind(&dto.name)
        .bind(&slug)
        .bind(dto.field_type)
        .bind(dto.options.as_ref().map(|o| json!(o)))
        .bind(dto.is_required.unwrap_or(false))
        .bind(dto.order.unwrap_or(0))
        .bind(&dto.help_text)
        .bind(dto.show_in_table.unwrap_or(false))
        .bind(dto.table_order.unwrap_or(0))
        .bind(dto.show_in_creation_wizard.unwrap_or(false))
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::unprocessable(anyhow!(DUPLICATE_FIELD));
            }
            AppError::from(e)
        })?;

        Ok(field)
    }

    #[instrument(skip(db))]
    pub async fn get(db: &PgPool, id: CustomFieldId) -> Result<CustomField, AppError> {
        sqlx::query_as::<_, CustomField>(
            r#"SELECT id, entity_type, name, slug, field_type, options, is_required, "order",
                      help_text, is_active, show_in_table, table_order, show_in_creation_wizard,
                      created_at, updated_at
               FROM custom_fields
               WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Custom field not found")))
    }

    /// Applies the provided attributes; absent ones keep their current value.
    #[instrument(skip(db))]
    pub async fn update(
        db: &PgPool,
        id: CustomFieldId,
        dto: UpdateCustomFieldDto,
    ) -> Result<CustomField, AppError> {
        let current = Self::get(db, id).await?;

        let field_type = dto.field_type.unwrap_or(current.field_type);
        let options = match dto.options {
            Some(options) => Some(json!(options)),
            None => current.options,
        };
        if field_type == FieldType::Select && options.is_none() {
            return Err(AppError::unprocessable(anyhow!(
                "Options are required for select fields"
            )));
        }

        let field = sqlx::query_as::<_, CustomField>(
            r#"UPDATE custom_fields
               SET name = $2, field_type = $3, options = $4, is_required = $5, "order" = $6,
                   help_text = $7, is_active = $8, show_in_table = $9, table_order = $10,
                   show_in_creation_wizard = $11, updated_at = NOW()
               WHERE id = $1
               RETURNING id, entity_type, name, slug, field_type, options, is_required, "order",
                         help_text, is_active, show_in_table, table_order,
                         show_in_creation_wizard, created_at, updated_at"#,
        )
        .bind(id)
        .bind(dto.name.unwrap_or(current.name))
        .bind(field_type)
        .bind(options)
        .bind(dto.is_required.unwrap_or(current.is_required))
        .bind(dto.order.unwrap_or(current.order))
        .bind(dto.help_text.unwrap_or(current.help_text))
        .bind(dto.is_active.unwrap_or(current.is_active))
        .bind(dto.show_in_table.unwrap_or(current.show_in_table))
        .bind(dto.table_order.unwrap_or(current.table_order))
        .bind(
            dto.show_in_creation_wizard
                .unwrap_or(current.show_in_creation_wizard),
        )
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Custom field not found")))?;

        Ok(field)
    }

    /// Removes the definition together with every value stored for it.
    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, id: CustomFieldId) -> Result<(), AppError> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM custom_field_values WHERE custom_field_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM custom_fields WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Custom field not found")));
        }

        tx.commit().await?;
        Ok(())
    }

    /// Sorted distinct non-empty values stored for the first field with `slug`.
    #[instrument(skip(db))]
    pub async fn distinct_values(db: &PgPool, slug: &str) -> Result<Vec<String>, AppError> {
        let field_id = sqlx::query_scalar::<_, CustomFieldId>(
            "SELECT id FROM custom_fields WHERE slug = $1 ORDER BY id LIMIT 1",
        )
        .bind(slug)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("Custom field not found")))?;

        let values = sqlx::query_scalar::<_, String>(
            r#"SELECT DISTINCT value
               FROM custom_field_values
               WHERE custom_field_id = $1 AND value IS NOT NULL AND value <> ''
               ORDER BY value"#,
        )
        .bind(field_id)
        .fetch_all(db)
        .await?;

        Ok(values)
    }
}
