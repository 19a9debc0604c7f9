//! In-memory [`CustomFieldRepository`] for tests.

use std::collections::HashSet;

use chrono::Utc;
use tokio::sync::RwLock;

use tonerdesk_models::custom_fields::{CustomField, CustomFieldValue, FieldType, SluggedValue};
use tonerdesk_models::ids::{CustomFieldId, CustomFieldValueId, EntityId};

use super::repository::{CustomFieldRepository, StoreError};

#[derive(Debug, Default)]
struct Tables {
    fields: Vec<CustomField>,
    values: Vec<CustomFieldValue>,
    next_field_id: i64,
    next_value_id: i64,
    failing_fields: HashSet<CustomFieldId>,
}

/// Keeps definitions and values in two vectors behind an async lock.
///
/// Enforces the same `(custom_field_id, entity_type, entity_id)` uniqueness
/// as the Postgres schema.
#[derive(Debug, Default)]
pub struct InMemoryCustomFieldRepository {
    tables: RwLock<Tables>,
}

impl InMemoryCustomFieldRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an active definition and returns it.
    pub async fn define_field(
        &self,
        entity_type: &str,
        slug: &str,
        field_type: FieldType,
    ) -> CustomField {
        let mut tables = self.tables.write().await;
        tables.next_field_id += 1;
        let now = Utc::now();

        let field = CustomField {
            id: CustomFieldId::new(tables.next_field_id),
            entity_type: entity_type.to_string(),
            name: slug.to_string(),
            slug: slug.to_string(),
            field_type,
            options: None,
            is_required: false,
            order: tables.fields.len() as i32,
            help_text: None,
            is_active: true,
            show_in_table: false,
            table_order: 0,
            show_in_creation_wizard: false,
            created_at: now,
            updated_at: now,
        };
        tables.fields.push(field.clone());
        field
    }

    /// Makes every later upsert for `field_id` fail with [`StoreError::Backend`].
    pub async fn fail_writes_for(&self, field_id: CustomFieldId) {
        self.tables.write().await.failing_fields.insert(field_id);
    }

    /// Total number of stored value rows, across all entities.
    pub async fn value_count(&self) -> usize {
        self.tables.read().await.values.len()
    }
}

impl CustomFieldRepository for InMemoryCustomFieldRepository {
    async fn find_field_definition(
        &self,
        entity_type: &str,
        slug: &str,
    ) -> Result<Option<CustomField>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .fields
            .iter()
            .filter(|f| f.entity_type == entity_type && f.slug == slug)
            .min_by_key(|f| f.id)
            .cloned())
    }

    async fn find_value(
        &self,
        field_id: CustomFieldId,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Option<CustomFieldValue>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .values
            .iter()
            .find(|v| {
                v.custom_field_id == field_id
                    && v.entity_type == entity_type
                    && v.entity_id == entity_id
            })
            .cloned())
    }

    async fn upsert_value(
        &self,
        field_id: CustomFieldId,
        entity_type: &str,
        entity_id: EntityId,
        value: Option<String>,
    ) -> Result<CustomFieldValue, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.failing_fields.contains(&field_id) {
            return Err(StoreError::Backend(format!(
                "writes to field {} are disabled",
                field_id
            )));
        }

        let now = Utc::now();
        let existing = tables.values.iter_mut().find(|v| {
            v.custom_field_id == field_id && v.entity_type == entity_type && v.entity_id == entity_id
        });

        if let Some(row) = existing {
            row.value = value;
            row.updated_at = now;
            return Ok(row.clone());
        }

        tables.next_value_id += 1;
        let row = CustomFieldValue {
            id: CustomFieldValueId::new(tables.next_value_id),
            custom_field_id: field_id,
            entity_type: entity_type.to_string(),
            entity_id,
            value,
            created_at: now,
            updated_at: now,
        };
        tables.values.push(row.clone());
        Ok(row)
    }

    async fn list_values_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Vec<CustomFieldValue>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .values
            .iter()
            .filter(|v| v.entity_type == entity_type && v.entity_id == entity_id)
            .cloned()
            .collect())
    }

    async fn list_slugged_values_for_entity(
        &self,
        entity_type: &str,
        entity_id: EntityId,
    ) -> Result<Vec<SluggedValue>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<(&CustomField, &CustomFieldValue)> = tables
            .values
            .iter()
            .filter(|v| v.entity_type == entity_type && v.entity_id == entity_id)
            .filter_map(|v| {
                tables
                    .fields
                    .iter()
                    .find(|f| f.id == v.custom_field_id)
                    .map(|f| (f, v))
            })
            .collect();
        rows.sort_by_key(|(f, _)| (f.order, f.id));

        Ok(rows
            .into_iter()
            .map(|(f, v)| SluggedValue {
                slug: f.slug.clone(),
                value: v.value.clone(),
            })
            .collect())
    }
}
