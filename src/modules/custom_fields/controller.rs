use anyhow::anyhow;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::{instrument, warn};

use tonerdesk_core::{AppError, permissions};
use tonerdesk_models::custom_fields::{
    CreateCustomFieldDto, CustomField, CustomFieldFilterParams, CustomFieldValueResponse,
    DistinctValuesResponse, EntityCustomFieldValues, MessageResponse, SetCustomFieldValueDto,
    SetCustomFieldValuesDto, UpdateCustomFieldDto, UpdateCustomFieldResponse,
};
use tonerdesk_models::entity::{EntityKind, EntityRef};
use tonerdesk_models::ids::{CustomFieldId, EntityId};

use crate::middleware::auth::{AuthUser, RequireConfigPage, RequireConfigWrite};
use crate::modules::custom_fields::admin::CustomFieldAdmin;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Page that lists entities of `kind`.
pub fn page_for(kind: &EntityKind) -> String {
    match kind {
        EntityKind::Printer => permissions::PAGE_PRINTERS.to_string(),
        EntityKind::Consumable => permissions::PAGE_INVENTORY.to_string(),
        EntityKind::Order => permissions::PAGE_ORDERS.to_string(),
        EntityKind::Other(_) => kind.tag(),
    }
}

/// Write module that guards changes to entities of `kind`.
pub fn write_module_for(kind: &EntityKind) -> String {
    match kind {
        EntityKind::Printer => permissions::MODULE_PRINTERS.to_string(),
        EntityKind::Consumable => permissions::MODULE_CONSUMABLES.to_string(),
        EntityKind::Order => permissions::MODULE_ORDERS.to_string(),
        EntityKind::Other(_) => kind.tag(),
    }
}

fn entity_ref(entity_type: &str, entity_id: EntityId) -> Result<EntityRef, AppError> {
    if entity_type.trim().is_empty() {
        return Err(AppError::bad_request(anyhow!("Entity type is required")));
    }
    Ok(EntityRef::new(EntityKind::from_tag(entity_type), entity_id))
}

#[utoipa::path(
    get,
    path = "/api/v2/config/custom-fields",
    params(CustomFieldFilterParams),
    responses(
        (status = 200, description = "Custom field definitions", body = Vec<CustomField>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires the config page")
    ),
    tag = "Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_custom_fields(
    State(state): State<AppState>,
    RequireConfigPage(_auth_user): RequireConfigPage,
    Query(filters): Query<CustomFieldFilterParams>,
) -> Result<Json<Vec<CustomField>>, AppError> {
    let fields = CustomFieldAdmin::list(&state.db, filters).await?;
    Ok(Json(fields))
}

#[utoipa::path(
    post,
    path = "/api/v2/config/custom-fields",
    request_body = CreateCustomFieldDto,
    responses(
        (status = 201, description = "Custom field created", body = CustomField),
        (status = 400, description = "Malformed request body"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires write access to config"),
        (status = 422, description = "Validation failed or duplicate name for this entity")
    ),
    tag = "Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn create_custom_field(
    State(state): State<AppState>,
    RequireConfigWrite(_auth_user): RequireConfigWrite,
    ValidatedJson(dto): ValidatedJson<CreateCustomFieldDto>,
) -> Result<(StatusCode, Json<CustomField>), AppError> {
    let field = CustomFieldAdmin::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(field)))
}

#[utoipa::path(
    get,
    path = "/api/v2/config/custom-fields/{field}",
    params(
        ("field" = i64, Path, description = "Custom field ID")
    ),
    responses(
        (status = 200, description = "Custom field definition", body = CustomField),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires the config page"),
        (status = 404, description = "Custom field not found")
    ),
    tag = "Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_custom_field(
    State(state): State<AppState>,
    RequireConfigPage(_auth_user): RequireConfigPage,
    Path(id): Path<CustomFieldId>,
) -> Result<Json<CustomField>, AppError> {
    let field = CustomFieldAdmin::get(&state.db, id).await?;
    Ok(Json(field))
}

#[utoipa::path(
    put,
    path = "/api/v2/config/custom-fields/{field}",
    params(
        ("field" = i64, Path, description = "Custom field ID")
    ),
    request_body = UpdateCustomFieldDto,
    responses(
        (status = 200, description = "Custom field updated", body = UpdateCustomFieldResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires write access to config"),
        (status = 404, description = "Custom field not found"),
        (status = 422, description = "Validation failed")
    ),
    tag = "Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_custom_field(
    State(state): State<AppState>,
    RequireConfigWrite(_auth_user): RequireConfigWrite,
    Path(id): Path<CustomFieldId>,
    ValidatedJson(dto): ValidatedJson<UpdateCustomFieldDto>,
) -> Result<Json<UpdateCustomFieldResponse>, AppError> {
    let field = CustomFieldAdmin::update(&state.db, id, dto).await?;
    Ok(Json(UpdateCustomFieldResponse {
        message: "Custom field updated".to_string(),
        data: field,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v2/config/custom-fields/{field}",
    params(
        ("field" = i64, Path, description = "Custom field ID")
    ),
    responses(
        (status = 200, description = "Custom field and its values deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires write access to config"),
        (status = 404, description = "Custom field not found")
    ),
    tag = "Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_custom_field(
    State(state): State<AppState>,
    RequireConfigWrite(_auth_user): RequireConfigWrite,
    Path(id): Path<CustomFieldId>,
) -> Result<Json<MessageResponse>, AppError> {
    CustomFieldAdmin::delete(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "Custom field deleted".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v2/config/custom-fields/{field}/values",
    params(
        ("field" = String, Path, description = "Custom field slug")
    ),
    responses(
        (status = 200, description = "Distinct stored values", body = DistinctValuesResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires the config page"),
        (status = 404, description = "Custom field not found")
    ),
    tag = "Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_custom_field_values(
    State(state): State<AppState>,
    RequireConfigPage(_auth_user): RequireConfigPage,
    Path(slug): Path<String>,
) -> Result<Json<DistinctValuesResponse>, AppError> {
    let values = CustomFieldAdmin::distinct_values(&state.db, &slug).await?;
    Ok(Json(DistinctValuesResponse { values }))
}

#[utoipa::path(
    get,
    path = "/api/v2/entities/{entity_type}/{entity_id}/custom-fields",
    params(
        ("entity_type" = String, Path, description = "Entity type tag, e.g. printer"),
        ("entity_id" = i64, Path, description = "Entity ID")
    ),
    responses(
        (status = 200, description = "Slug to value map", body = EntityCustomFieldValues),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires the entity's page")
    ),
    tag = "Entity Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_entity_custom_fields(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((entity_type, entity_id)): Path<(String, EntityId)>,
) -> Result<Json<EntityCustomFieldValues>, AppError> {
    let entity = entity_ref(&entity_type, entity_id)?;
    auth_user.require_page(&page_for(&entity.kind))?;

    let custom_field_values = state.custom_fields().custom_field_map(&entity).await?;
    Ok(Json(EntityCustomFieldValues {
        custom_field_values,
    }))
}

#[utoipa::path(
    put,
    path = "/api/v2/entities/{entity_type}/{entity_id}/custom-fields",
    params(
        ("entity_type" = String, Path, description = "Entity type tag, e.g. printer"),
        ("entity_id" = i64, Path, description = "Entity ID")
    ),
    request_body = SetCustomFieldValuesDto,
    responses(
        (status = 200, description = "Values saved; returns the resulting map", body = EntityCustomFieldValues),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires write access to the entity's module")
    ),
    tag = "Entity Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.user_id()))]
pub async fn set_entity_custom_fields(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((entity_type, entity_id)): Path<(String, EntityId)>,
    Json(dto): Json<SetCustomFieldValuesDto>,
) -> Result<Json<EntityCustomFieldValues>, AppError> {
    let entity = entity_ref(&entity_type, entity_id)?;
    auth_user.require_write(&write_module_for(&entity.kind))?;

    let store = state.custom_fields();
    let failures = store
        .set_custom_field_values(&entity, &dto.custom_field_values)
        .await;
    if failures > 0 {
        warn!(entity = %entity, failures, "Some custom field values were not saved");
    }

    let custom_field_values = store.custom_field_map(&entity).await?;
    Ok(Json(EntityCustomFieldValues {
        custom_field_values,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v2/entities/{entity_type}/{entity_id}/custom-fields/{slug}",
    params(
        ("entity_type" = String, Path, description = "Entity type tag, e.g. printer"),
        ("entity_id" = i64, Path, description = "Entity ID"),
        ("slug" = String, Path, description = "Custom field slug")
    ),
    responses(
        (status = 200, description = "Stored value, null when unset or unknown", body = CustomFieldValueResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires the entity's page")
    ),
    tag = "Entity Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn get_entity_custom_field(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((entity_type, entity_id, slug)): Path<(String, EntityId, String)>,
) -> Result<Json<CustomFieldValueResponse>, AppError> {
    let entity = entity_ref(&entity_type, entity_id)?;
    auth_user.require_page(&page_for(&entity.kind))?;

    let value = state
        .custom_fields()
        .get_custom_field_value(&entity, &slug)
        .await?;
    Ok(Json(CustomFieldValueResponse { slug, value }))
}

#[utoipa::path(
    put,
    path = "/api/v2/entities/{entity_type}/{entity_id}/custom-fields/{slug}",
    params(
        ("entity_type" = String, Path, description = "Entity type tag, e.g. printer"),
        ("entity_id" = i64, Path, description = "Entity ID"),
        ("slug" = String, Path, description = "Custom field slug")
    ),
    request_body = SetCustomFieldValueDto,
    responses(
        (status = 200, description = "Value saved; unknown slugs are ignored", body = CustomFieldValueResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires write access to the entity's module")
    ),
    tag = "Entity Custom Fields",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto), fields(user_id = %auth_user.user_id()))]
pub async fn set_entity_custom_field(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((entity_type, entity_id, slug)): Path<(String, EntityId, String)>,
    Json(dto): Json<SetCustomFieldValueDto>,
) -> Result<Json<CustomFieldValueResponse>, AppError> {
    let entity = entity_ref(&entity_type, entity_id)?;
    auth_user.require_write(&write_module_for(&entity.kind))?;

    let store = state.custom_fields();
    store.set_custom_field_value(&entity, &slug, dto.value).await?;

    let value = store.get_custom_field_value(&entity, &slug).await?;
    Ok(Json(CustomFieldValueResponse { slug, value }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_module_for_known_kinds() {
        assert_eq!(write_module_for(&EntityKind::Printer), "printers");
        assert_eq!(write_module_for(&EntityKind::Consumable), "consumables");
        assert_eq!(write_module_for(&EntityKind::Order), "orders");
    }

    #[test]
    fn test_other_kinds_use_their_tag() {
        let kind = EntityKind::named("Site");
        assert_eq!(write_module_for(&kind), "site");
        assert_eq!(page_for(&kind), "site");
    }

    #[test]
    fn test_page_for_known_kinds() {
        assert_eq!(page_for(&EntityKind::Printer), "printers");
        assert_eq!(page_for(&EntityKind::Consumable), "inventory");
        assert_eq!(page_for(&EntityKind::Order), "orders");
    }

    #[test]
    fn test_entity_ref_rejects_blank_type() {
        let err = entity_ref("  ", EntityId::new(1)).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let entity = entity_ref("Printer", EntityId::new(1)).unwrap();
        assert_eq!(entity.kind, EntityKind::Printer);
    }
}
