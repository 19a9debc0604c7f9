use axum::body::Body;
use axum::http::{Request, StatusCode};
use fake::Fake;
use fake::faker::lorem::en::Word;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use tonerdesk::router::init_router;
use tonerdesk::state::AppState;
use tonerdesk_auth::create_access_token;
use tonerdesk_config::{CorsConfig, JwtConfig};
use tonerdesk_core::Actor;
use tonerdesk_models::custom_fields::FieldType;
use tonerdesk_models::ids::CustomFieldId;

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry: 3600,
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(
        pool,
        test_jwt_config(),
        CorsConfig::from_list("http://localhost:5173"),
    )
}

#[allow(dead_code)]
pub fn setup_test_app(pool: PgPool) -> axum::Router {
    init_router(test_state(pool))
}

/// Mints a token for `actor` signed with the test state's secret.
#[allow(dead_code)]
pub fn token_for(actor: &Actor) -> String {
    create_access_token("1", "tech@example.com", actor, &test_jwt_config()).unwrap()
}

/// An actor allowed to administer custom fields and edit every entity kind.
#[allow(dead_code)]
pub fn config_admin() -> Actor {
    Actor::default().with_write_modules(["config", "printers", "consumables", "orders"])
}

#[allow(dead_code)]
pub fn unique_field_name() -> String {
    let word: String = Word().fake();
    format!("{} {}", word, uuid::Uuid::new_v4().simple())
}

/// Inserts a definition directly and returns its id.
#[allow(dead_code)]
pub async fn insert_field(
    pool: &PgPool,
    entity_type: &str,
    slug: &str,
    field_type: FieldType,
) -> CustomFieldId {
    sqlx::query_scalar::<_, CustomFieldId>(
        r#"INSERT INTO custom_fields (entity_type, name, slug, field_type)
           VALUES ($1, $2, $2, $3)
           RETURNING id"#,
    )
    .bind(entity_type)
    .bind(slug)
    .bind(field_type)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn count_values(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM custom_field_values")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Sends one request and returns the status with the parsed JSON body.
#[allow(dead_code)]
pub async fn send(
    app: axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
