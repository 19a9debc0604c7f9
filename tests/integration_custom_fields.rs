mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;

use common::{config_admin, insert_field, send, setup_test_app, token_for, unique_field_name};
use tonerdesk_core::{Actor, LocationPermissions};
use tonerdesk_models::custom_fields::FieldType;

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_token_is_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool);
    let (status, body) = send(app, "GET", "/api/v2/config/custom-fields", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Missing authorization header");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_invalid_token_is_unauthorized(pool: PgPool) {
    let app = setup_test_app(pool);
    let (status, _) = send(
        app,
        "GET",
        "/api/v2/config/custom-fields",
        Some("not-a-jwt"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_custom_field(pool: PgPool) {
    let token = token_for(&config_admin());
    let app = setup_test_app(pool);

    let (status, body) = send(
        app,
        "POST",
        "/api/v2/config/custom-fields",
        Some(&token),
        Some(json!({
            "entity_type": "printer",
            "name": "Warranty End",
            "type": "date",
            "show_in_table": true,
            "table_order": 3
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["slug"], "warranty-end");
    assert_eq!(body["type"], "date");
    assert_eq!(body["show_in_table"], true);
    assert_eq!(body["table_order"], 3);
    assert!(body["id"].is_i64());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_duplicate_is_unprocessable(pool: PgPool) {
    let token = token_for(&config_admin());
    let payload = json!({"entity_type": "order", "name": "PO Number", "type": "text"});

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/v2/config/custom-fields",
        Some(&token),
        Some(payload.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        setup_test_app(pool),
        "POST",
        "/api/v2/config/custom-fields",
        Some(&token),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["error"],
        "A field with this name already exists for this entity"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_validation_errors(pool: PgPool) {
    let token = token_for(&config_admin());

    let (status, _) = send(
        setup_test_app(pool.clone()),
        "POST",
        "/api/v2/config/custom-fields",
        Some(&token),
        Some(json!({"entity_type": "site", "name": "Zone", "type": "text"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        setup_test_app(pool),
        "POST",
        "/api/v2/config/custom-fields",
        Some(&token),
        Some(json!({"entity_type": "printer", "name": "Zone", "type": "select"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "Options are required for select fields");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_requires_config_write(pool: PgPool) {
    // Can see every page but was never granted write access.
    let token = token_for(&Actor::default());
    let app = setup_test_app(pool);

    let (status, body) = send(
        app,
        "POST",
        "/api/v2/config/custom-fields",
        Some(&token),
        Some(json!({"entity_type": "printer", "name": &unique_field_name(), "type": "text"})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("config"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_requires_config_page(pool: PgPool) {
    insert_field(&pool, "printer", "floor", FieldType::Number).await;

    let restricted = token_for(&Actor::default().with_pages(["printers"]));
    let (status, _) = send(
        setup_test_app(pool.clone()),
        "GET",
        "/api/v2/config/custom-fields",
        Some(&restricted),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let open = token_for(&Actor::default());
    let (status, body) = send(
        setup_test_app(pool),
        "GET",
        "/api/v2/config/custom-fields?entity_type=printer",
        Some(&open),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["slug"], "floor");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_get_update_delete_custom_field(pool: PgPool) {
    let token = token_for(&config_admin());
    let id = insert_field(&pool, "consumable", "yield", FieldType::Number).await;
    let uri = format!("/api/v2/config/custom-fields/{}", id);

    let (status, body) = send(setup_test_app(pool.clone()), "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity_type"], "consumable");

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        &uri,
        Some(&token),
        Some(json!({"name": "Page yield", "is_required": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Custom field updated");
    assert_eq!(body["data"]["name"], "Page yield");
    assert_eq!(body["data"]["slug"], "yield");
    assert_eq!(body["data"]["is_required"], true);

    let (status, _) = send(setup_test_app(pool.clone()), "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(setup_test_app(pool), "GET", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_help_text_set_then_cleared(pool: PgPool) {
    let token = token_for(&config_admin());
    let id = insert_field(&pool, "printer", "toner_model", FieldType::Text).await;
    let uri = format!("/api/v2/config/custom-fields/{}", id);

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        &uri,
        Some(&token),
        Some(json!({"help_text": "As printed on the cartridge"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["help_text"], "As printed on the cartridge");

    let (_, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        &uri,
        Some(&token),
        Some(json!({"is_active": false})),
    )
    .await;
    assert_eq!(body["data"]["help_text"], "As printed on the cartridge");

    let (status, body) = send(
        setup_test_app(pool),
        "PUT",
        &uri,
        Some(&token),
        Some(json!({"help_text": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["help_text"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_entity_values_round_trip(pool: PgPool) {
    insert_field(&pool, "printer", "warranty_end", FieldType::Date).await;
    insert_field(&pool, "printer", "floor", FieldType::Number).await;
    let token = token_for(&Actor::default().with_write_modules(["printers"]));

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        "/api/v2/entities/printer/7/custom-fields",
        Some(&token),
        Some(json!({
            "custom_field_values": {
                "warranty_end": "2026-01-01",
                "floor": 2,
                "unknown": "ignored"
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["custom_field_values"]["warranty_end"], "2026-01-01");
    assert_eq!(body["custom_field_values"]["floor"], "2");
    assert!(body["custom_field_values"].get("unknown").is_none());

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "GET",
        "/api/v2/entities/printer/7/custom-fields/warranty_end",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "2026-01-01");

    let (status, body) = send(
        setup_test_app(pool),
        "GET",
        "/api/v2/entities/printer/8/custom-fields/warranty_end",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["value"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_entity_single_value_clear(pool: PgPool) {
    insert_field(&pool, "order", "po_number", FieldType::Text).await;
    let token = token_for(&Actor::default().with_write_modules(["orders"]));
    let uri = "/api/v2/entities/order/3/custom-fields/po_number";

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "PUT",
        uri,
        Some(&token),
        Some(json!({"value": "PO-991"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["value"], "PO-991");

    let (status, body) = send(
        setup_test_app(pool),
        "PUT",
        uri,
        Some(&token),
        Some(json!({"value": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["value"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_entity_write_requires_module(pool: PgPool) {
    insert_field(&pool, "printer", "floor", FieldType::Number).await;
    let token = token_for(&Actor::default().with_write_modules(["inventory"]));

    let (status, body) = send(
        setup_test_app(pool),
        "PUT",
        "/api/v2/entities/printer/1/custom-fields/floor",
        Some(&token),
        Some(json!({"value": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("printers"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_entity_read_requires_page(pool: PgPool) {
    let actor = Actor::default()
        .with_pages(["dashboard"])
        .with_locations(LocationPermissions::default());
    let token = token_for(&actor);

    let (status, _) = send(
        setup_test_app(pool),
        "GET",
        "/api/v2/entities/printer/1/custom-fields",
        Some(&token),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_distinct_values_endpoint(pool: PgPool) {
    insert_field(&pool, "printer", "building", FieldType::Text).await;
    let token = token_for(&config_admin());

    for (id, building) in [(1, "North"), (2, "East"), (3, "North")] {
        let (status, _) = send(
            setup_test_app(pool.clone()),
            "PUT",
            &format!("/api/v2/entities/printer/{}/custom-fields/building", id),
            Some(&token),
            Some(json!({"value": building})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        setup_test_app(pool.clone()),
        "GET",
        "/api/v2/config/custom-fields/building/values",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["values"], json!(["East", "North"]));

    let (status, _) = send(
        setup_test_app(pool),
        "GET",
        "/api/v2/config/custom-fields/nothing/values",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_openapi_document_served(pool: PgPool) {
    let (status, body) = send(setup_test_app(pool), "GET", "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "TonerDesk API");
}
