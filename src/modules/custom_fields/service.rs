use std::collections::BTreeMap;

use serde_json::{Number, Value};
use tracing::{debug, error, instrument};

use tonerdesk_models::custom_fields::CustomFieldValue;
use tonerdesk_models::entity::HasCustomFields;

use super::repository::{CustomFieldRepository, StoreError};

/// Converts an incoming value to its stored text form.
///
/// `null` and `""` clear the value. `true` is stored as `"1"` and `false` as
/// an empty string, the same text a string cast of a boolean yields.
/// Integral floats drop their fraction (`1.0` is stored as `"1"`); arrays and
/// objects are stored as compact JSON.
pub fn normalize_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_text(n)),
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

// Beyond 2^53 a float no longer holds every integer, so the JSON text is kept.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Reads and writes custom-field values for any [`HasCustomFields`] entity.
///
/// Unknown slugs are never an error: reads return `None` and writes do
/// nothing.
#[derive(Debug, Clone)]
pub struct CustomFieldStore<R> {
    repo: R,
}

impl<R: CustomFieldRepository> CustomFieldStore<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Every stored value row belonging to `entity`.
    #[instrument(skip(self, entity), fields(entity_type = %entity.entity_type(), entity_id = %entity.entity_id()))]
    pub async fn related_values<E: HasCustomFields>(
        &self,
        entity: &E,
    ) -> Result<Vec<CustomFieldValue>, StoreError> {
        self.repo
            .list_values_for_entity(&entity.entity_type(), entity.entity_id())
            .await
    }

    #[instrument(skip(self, entity), fields(entity_type = %entity.entity_type(), entity_id = %entity.entity_id()))]
    pub async fn get_custom_field_value<E: HasCustomFields>(
        &self,
        entity: &E,
        slug: &str,
    ) -> Result<Option<String>, StoreError> {
        let entity_type = entity.entity_type();

        let Some(field) = self.repo.find_field_definition(&entity_type, slug).await? else {
            return Ok(None);
        };

        let value = self
            .repo
            .find_value(field.id, &entity_type, entity.entity_id())
            .await?;

        Ok(value.and_then(|v| v.value))
    }

    #[instrument(skip(self, entity, value), fields(entity_type = %entity.entity_type(), entity_id = %entity.entity_id()))]
    pub async fn set_custom_field_value<E: HasCustomFields>(
        &self,
        entity: &E,
        slug: &str,
        value: impl Into<Value>,
    ) -> Result<(), StoreError> {
        let entity_type = entity.entity_type();

        let Some(field) = self.repo.find_field_definition(&entity_type, slug).await? else {
            debug!(slug, "No custom field with this slug, ignoring write");
            return Ok(());
        };

        let stored = normalize_value(&value.into());
        self.repo
            .upsert_value(field.id, &entity_type, entity.entity_id(), stored)
            .await?;

        debug!(slug, field_id = %field.id, "Custom field value saved");
        Ok(())
    }

    /// Slug to value map of everything stored for `entity`.
    #[instrument(skip(self, entity), fields(entity_type = %entity.entity_type(), entity_id = %entity.entity_id()))]
    pub async fn custom_field_map<E: HasCustomFields>(
        &self,
        entity: &E,
    ) -> Result<BTreeMap<String, Option<String>>, StoreError> {
        let rows = self
            .repo
            .list_slugged_values_for_entity(&entity.entity_type(), entity.entity_id())
            .await?;

        Ok(rows.into_iter().map(|r| (r.slug, r.value)).collect())
    }

    /// Writes each pair independently. A failing slug is logged and skipped;
    /// returns how many failed.
    #[instrument(skip(self, entity, values), fields(entity_type = %entity.entity_type(), entity_id = %entity.entity_id(), count = values.len()))]
    pub async fn set_custom_field_values<E: HasCustomFields>(
        &self,
        entity: &E,
        values: &BTreeMap<String, Value>,
    ) -> usize {
        let mut failures = 0;

        for (slug, value) in values {
            if let Err(e) = self.set_custom_field_value(entity, slug, value.clone()).await {
                error!(slug = %slug, error = %e, "Failed to save custom field value");
                failures += 1;
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::custom_fields::memory::InMemoryCustomFieldRepository;
    use serde_json::json;
    use tonerdesk_models::custom_fields::FieldType;
    use tonerdesk_models::entity::{EntityKind, EntityRef};
    use tonerdesk_models::ids::EntityId;

    fn printer(id: i64) -> EntityRef {
        EntityRef::new(EntityKind::Printer, EntityId::new(id))
    }

    async fn store_with_fields() -> CustomFieldStore<InMemoryCustomFieldRepository> {
        let repo = InMemoryCustomFieldRepository::new();
        repo.define_field("printer", "warranty_end", FieldType::Date).await;
        repo.define_field("printer", "floor", FieldType::Number).await;
        repo.define_field("consumable", "warranty_end", FieldType::Date).await;
        CustomFieldStore::new(repo)
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(&Value::Null), None);
        assert_eq!(normalize_value(&json!("")), None);
        assert_eq!(normalize_value(&json!(" ")), Some(" ".to_string()));
        assert_eq!(normalize_value(&json!("HP-4000")), Some("HP-4000".to_string()));
        assert_eq!(normalize_value(&json!(3)), Some("3".to_string()));
        assert_eq!(normalize_value(&json!(2.5)), Some("2.5".to_string()));
        assert_eq!(normalize_value(&json!(1.0)), Some("1".to_string()));
        assert_eq!(normalize_value(&json!(-4.0)), Some("-4".to_string()));
        assert_eq!(normalize_value(&json!(1e300)), Some("1e300".to_string()));
        assert_eq!(normalize_value(&json!(true)), Some("1".to_string()));
        assert_eq!(normalize_value(&json!(false)), Some(String::new()));
        assert_eq!(normalize_value(&json!(["a", "b"])), Some(r#"["a","b"]"#.to_string()));
    }

    #[tokio::test]
    async fn test_warranty_end_round_trip_is_per_entity() {
        let store = store_with_fields().await;

        store
            .set_custom_field_value(&printer(7), "warranty_end", "2026-01-01")
            .await
            .unwrap();

        let value = store.get_custom_field_value(&printer(7), "warranty_end").await.unwrap();
        assert_eq!(value.as_deref(), Some("2026-01-01"));

        let other = store.get_custom_field_value(&printer(8), "warranty_end").await.unwrap();
        assert_eq!(other, None);
    }

    #[tokio::test]
    async fn test_round_trip_returns_normalized_value() {
        let store = store_with_fields().await;
        let entity = printer(1);

        for (input, expected) in [
            (json!("3rd"), Some("3rd")),
            (json!(3), Some("3")),
            (json!(true), Some("1")),
            (json!(2.0), Some("2")),
            (json!(""), None),
            (Value::Null, None),
        ] {
            store.set_custom_field_value(&entity, "floor", input).await.unwrap();
            let value = store.get_custom_field_value(&entity, "floor").await.unwrap();
            assert_eq!(value.as_deref(), expected);
        }
    }

    #[tokio::test]
    async fn test_repeated_set_keeps_one_row() {
        let store = store_with_fields().await;
        let entity = printer(7);

        store.set_custom_field_value(&entity, "floor", 2).await.unwrap();
        store.set_custom_field_value(&entity, "floor", 2).await.unwrap();

        assert_eq!(store.repository().value_count().await, 1);
        let rows = store.related_values(&entity).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value.as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_clearing_keeps_row_with_null_value() {
        let store = store_with_fields().await;
        let entity = printer(7);

        store.set_custom_field_value(&entity, "floor", "5").await.unwrap();
        store.set_custom_field_value(&entity, "floor", "").await.unwrap();

        let rows = store.related_values(&entity).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, None);
    }

    #[tokio::test]
    async fn test_unchecked_checkbox_is_stored_as_empty_text() {
        let store = store_with_fields().await;
        store
            .repository()
            .define_field("printer", "duplex", FieldType::Checkbox)
            .await;
        let entity = printer(3);

        store.set_custom_field_value(&entity, "duplex", true).await.unwrap();
        let checked = store.get_custom_field_value(&entity, "duplex").await.unwrap();
        assert_eq!(checked.as_deref(), Some("1"));

        store.set_custom_field_value(&entity, "duplex", false).await.unwrap();
        let unchecked = store.get_custom_field_value(&entity, "duplex").await.unwrap();
        assert_eq!(unchecked.as_deref(), Some(""));
        assert_eq!(store.related_values(&entity).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_silent() {
        let store = store_with_fields().await;
        let entity = printer(7);

        assert_eq!(
            store.get_custom_field_value(&entity, "no-such-field").await.unwrap(),
            None
        );
        store
            .set_custom_field_value(&entity, "no-such-field", "x")
            .await
            .unwrap();

        assert_eq!(store.repository().value_count().await, 0);
    }

    #[tokio::test]
    async fn test_slug_defined_for_other_entity_type_is_unknown() {
        let store = store_with_fields().await;
        let order = EntityRef::new(EntityKind::Order, EntityId::new(7));

        store.set_custom_field_value(&order, "floor", 1).await.unwrap();
        assert_eq!(store.repository().value_count().await, 0);
    }

    #[tokio::test]
    async fn test_same_id_different_kind_does_not_collide() {
        let store = store_with_fields().await;
        let consumable = EntityRef::new(EntityKind::Consumable, EntityId::new(7));

        store
            .set_custom_field_value(&printer(7), "warranty_end", "2026-01-01")
            .await
            .unwrap();
        store
            .set_custom_field_value(&consumable, "warranty_end", "2027-06-30")
            .await
            .unwrap();

        let printer_rows = store.related_values(&printer(7)).await.unwrap();
        assert_eq!(printer_rows.len(), 1);
        assert_eq!(printer_rows[0].entity_type, "printer");
        assert_eq!(
            store
                .get_custom_field_value(&consumable, "warranty_end")
                .await
                .unwrap()
                .as_deref(),
            Some("2027-06-30")
        );
    }

    #[tokio::test]
    async fn test_related_values_for_unknown_kind_uses_fallback_tag() {
        let repo = InMemoryCustomFieldRepository::new();
        repo.define_field("stockmovement", "batch", FieldType::Text).await;
        let store = CustomFieldStore::new(repo);
        let movement = EntityRef::new(
            EntityKind::named("inventory::StockMovement"),
            EntityId::new(2),
        );

        store.set_custom_field_value(&movement, "batch", "B-17").await.unwrap();

        let rows = store.related_values(&movement).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_type, "stockmovement");
    }

    #[tokio::test]
    async fn test_custom_field_map() {
        let store = store_with_fields().await;
        let entity = printer(3);

        store
            .set_custom_field_value(&entity, "warranty_end", "2025-12-31")
            .await
            .unwrap();
        store.set_custom_field_value(&entity, "floor", Value::Null).await.unwrap();

        let map = store.custom_field_map(&entity).await.unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["warranty_end"].as_deref(), Some("2025-12-31"));
        assert_eq!(map["floor"], None);

        assert!(store.custom_field_map(&printer(4)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_set_skips_failures() {
        let repo = InMemoryCustomFieldRepository::new();
        let broken = repo.define_field("printer", "broken", FieldType::Text).await;
        repo.define_field("printer", "floor", FieldType::Number).await;
        repo.fail_writes_for(broken.id).await;
        let store = CustomFieldStore::new(repo);
        let entity = printer(9);

        let values = BTreeMap::from([
            ("broken".to_string(), json!("x")),
            ("floor".to_string(), json!(4)),
            ("unknown".to_string(), json!("ignored")),
        ]);
        let failures = store.set_custom_field_values(&entity, &values).await;

        assert_eq!(failures, 1);
        assert_eq!(
            store.get_custom_field_value(&entity, "floor").await.unwrap().as_deref(),
            Some("4")
        );
        assert_eq!(store.repository().value_count().await, 1);
    }
}
