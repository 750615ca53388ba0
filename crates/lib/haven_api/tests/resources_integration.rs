//! Integration tests for resource CRUD, reference expansion, and the
//! update permission check.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use haven_api::{AppState, config::ApiConfig};
use haven_core::db::LocalDbManager;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

async fn setup() -> (LocalDbManager, PgPool, Router) {
    let mut db = LocalDbManager::ephemeral()
        .await
        .expect("LocalDbManager::ephemeral");
    db.setup().await.expect("db setup");
    db.start().await.expect("db start");

    let pool = PgPool::connect(&db.connection_url())
        .await
        .expect("connect to ephemeral PG");
    haven_api::migrate(&pool).await.expect("migrations");

    let state = AppState {
        pool: pool.clone(),
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            pg_connection_url: db.connection_url(),
            jwt_secret: "test-secret".into(),
            refresh_token_ttl_days: 30,
            bcrypt_cost: 4,
        },
    };

    let app = haven_api::router(state);
    (db, pool, app)
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, json)
}

/// Register a user and return their access token (first caller becomes owner).
async fn register(app: &Router, email: &str, token: Option<&str>, extra: Value) -> Value {
    let mut body = json!({"email": email, "password": "password-123"});
    if let Some(map) = extra.as_object() {
        for (k, v) in map {
            body[k] = v.clone();
        }
    }
    let (status, resp) = request(app, "POST", "/api/auth/register", token, Some(body)).await;
    assert_eq!(status, StatusCode::OK, "register failed: {resp}");
    resp
}

async fn seed_location(pool: &PgPool, name: &str, city: &str) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO locations (id, name, city) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(name)
        .bind(city)
        .execute(pool)
        .await
        .expect("seed location");
    id
}

async fn seed_category(pool: &PgPool, name: &str) -> Uuid {
    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await
        .expect("seed category");
    id
}

#[tokio::test]
async fn crud_with_reference_expansion() {
    let (mut db, pool, app) = setup().await;

    let (status, health) = request(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "ok");
    assert_eq!(health["db_connected"], true);

    let owner = register(&app, "owner@example.com", None, json!({})).await;
    let owner_token = owner["access_token"].as_str().unwrap();

    let location_id = seed_location(&pool, "Community Center", "Springfield").await;
    let category_id = seed_category(&pool, "Food Bank").await;

    // Create requires authentication.
    let (status, _) = request(
        &app,
        "POST",
        "/api/resources/create",
        None,
        Some(json!({"name": "Haven House"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Missing name is a validation error.
    let (status, _) = request(
        &app,
        "POST",
        "/api/resources/create",
        Some(owner_token),
        Some(json!({"description": "no name"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = request(
        &app,
        "POST",
        "/api/resources/create",
        Some(owner_token),
        Some(json!({
            "name": "Haven House",
            "description": "Emergency shelter",
            "website": "https://havenhouse.example.com",
            "location_ids": [location_id],
            "category_ids": [category_id],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create failed: {created}");
    let resource_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["created_by"], owner["user"]["id"]);

    // Bare list leaves references as IDs.
    let (status, list) = request(&app, "GET", "/api/resources/list", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["locations"][0], json!(location_id.to_string()));
    assert_eq!(list[0]["categories"][0], json!(category_id.to_string()));

    // Expansion flags populate full objects.
    let (status, list) = request(
        &app,
        "GET",
        "/api/resources/list?locations=true&categories=true",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["locations"][0]["name"], "Community Center");
    assert_eq!(list[0]["locations"][0]["city"], "Springfield");
    assert_eq!(list[0]["categories"][0]["name"], "Food Bank");

    // Read-by-id honors the same flags.
    let (status, read) = request(
        &app,
        "GET",
        &format!("/api/resources/{resource_id}?locations=true"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(read["locations"][0]["name"], "Community Center");
    assert_eq!(read["categories"][0], json!(category_id.to_string()));

    // Unknown IDs are 404, malformed are 400.
    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/resources/{}", Uuid::now_v7()),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = request(&app, "GET", "/api/resources/not-a-uuid", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Reference listings for client filters.
    let (status, locations) = request(&app, "GET", "/api/locations/list", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(locations[0]["name"], "Community Center");
    let (status, categories) = request(&app, "GET", "/api/categories/list", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(categories[0]["name"], "Food Bank");

    // Partial update keeps absent fields.
    let (status, updated) = request(
        &app,
        "POST",
        &format!("/api/resources/update/{resource_id}"),
        Some(owner_token),
        Some(json!({"description": "Emergency shelter and food bank"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Haven House");
    assert_eq!(updated["description"], "Emergency shelter and food bank");

    // Delete, then the row is gone.
    let (status, _) = request(
        &app,
        "DELETE",
        &format!("/api/resources/delete/{resource_id}"),
        Some(owner_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = request(
        &app,
        "GET",
        &format!("/api/resources/{resource_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    db.stop().await.expect("db stop");
}

#[tokio::test]
async fn update_requires_ownership_or_permission() {
    let (mut db, _pool, app) = setup().await;

    let owner = register(&app, "owner@example.com", None, json!({})).await;
    let owner_token = owner["access_token"].as_str().unwrap();

    let (status, created) = request(
        &app,
        "POST",
        "/api/resources/create",
        Some(owner_token),
        Some(json!({"name": "Haven House"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let resource_id = created["id"].as_str().unwrap().to_string();

    // An editor without the resource in their permission list is refused.
    let outsider = register(&app, "outsider@example.com", None, json!({})).await;
    let (status, _) = request(
        &app,
        "POST",
        &format!("/api/resources/update/{resource_id}"),
        Some(outsider["access_token"].as_str().unwrap()),
        Some(json!({"name": "Hijacked"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // An editor granted the resource by the owner may update it.
    let trusted = register(
        &app,
        "trusted@example.com",
        Some(owner_token),
        json!({"editable_resources": [resource_id]}),
    )
    .await;
    let (status, updated) = request(
        &app,
        "POST",
        &format!("/api/resources/update/{resource_id}"),
        Some(trusted["access_token"].as_str().unwrap()),
        Some(json!({"website": "https://havenhouse.example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["website"], "https://havenhouse.example.com");
    assert_eq!(updated["name"], "Haven House");

    db.stop().await.expect("db stop");
}
