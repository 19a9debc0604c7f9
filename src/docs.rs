use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use tonerdesk_core::{Actor, LocationPermissions};
use tonerdesk_models::custom_fields::{
    CreateCustomFieldDto, CustomField, CustomFieldValue, CustomFieldValueResponse,
    DistinctValuesResponse, EntityCustomFieldValues, FieldType, MessageResponse,
    SetCustomFieldValueDto, SetCustomFieldValuesDto, UpdateCustomFieldDto,
    UpdateCustomFieldResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::custom_fields::controller::list_custom_fields,
        crate::modules::custom_fields::controller::create_custom_field,
        crate::modules::custom_fields::controller::get_custom_field,
        crate::modules::custom_fields::controller::update_custom_field,
        crate::modules::custom_fields::controller::delete_custom_field,
        crate::modules::custom_fields::controller::get_custom_field_values,
        crate::modules::custom_fields::controller::get_entity_custom_fields,
        crate::modules::custom_fields::controller::set_entity_custom_fields,
        crate::modules::custom_fields::controller::get_entity_custom_field,
        crate::modules::custom_fields::controller::set_entity_custom_field,
    ),
    components(
        schemas(
            Actor,
            LocationPermissions,
            CustomField,
            CustomFieldValue,
            FieldType,
            CreateCustomFieldDto,
            UpdateCustomFieldDto,
            UpdateCustomFieldResponse,
            DistinctValuesResponse,
            EntityCustomFieldValues,
            SetCustomFieldValuesDto,
            SetCustomFieldValueDto,
            CustomFieldValueResponse,
            MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Custom Fields", description = "Custom field definition management"),
        (name = "Entity Custom Fields", description = "Custom field values of printers, consumables and orders")
    ),
    info(
        title = "TonerDesk API",
        version = "0.1.0",
        description = "Printer fleet and consumables management: access checks and custom fields.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
