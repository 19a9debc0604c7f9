use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    create_custom_field, delete_custom_field, get_custom_field, get_custom_field_values,
    get_entity_custom_field, get_entity_custom_fields, list_custom_fields,
    set_entity_custom_field, set_entity_custom_fields, update_custom_field,
};

/// Definition administration, mounted at `/config/custom-fields`.
pub fn init_custom_fields_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_custom_fields).post(create_custom_field))
        .route(
            "/{field}",
            get(get_custom_field)
                .put(update_custom_field)
                .delete(delete_custom_field),
        )
        .route("/{field}/values", get(get_custom_field_values))
}

/// Per-entity values, mounted at `/entities`.
pub fn init_entity_custom_fields_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{entity_type}/{entity_id}/custom-fields",
            get(get_entity_custom_fields).put(set_entity_custom_fields),
        )
        .route(
            "/{entity_type}/{entity_id}/custom-fields/{slug}",
            get(get_entity_custom_field).put(set_entity_custom_field),
        )
}
