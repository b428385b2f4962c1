//! End-to-end API tests against the assembled router with an in-memory
//! database: registration, auth enforcement, catalogue, order placement and
//! the report endpoint.

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use store_api::ServerState;
use store_api::core::build_router;

async fn test_router() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = ServerState::initialize_in_memory(&dir.path().to_string_lossy())
        .await
        .unwrap();
    (build_router(state), dir)
}

async fn send(
    router: &Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(router: &Router, email: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/users",
        None,
        Some(json!({
            "name": "Ana",
            "email": email,
            "password": "long-enough-secret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn create_product(router: &Router, token: &str, name: &str, price: f64, stock: i64) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/api/products",
        Some(token),
        Some(json!({
            "name": name,
            "description": "test product",
            "price": price,
            "stock": stock,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["product"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let (router, _dir) = test_router().await;
    let (status, body) = send(&router, Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn register_then_login() {
    let (router, _dir) = test_router().await;
    register(&router, "ana@example.com").await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "ana@example.com", "password": "long-enough-secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "ana@example.com");

    // Wrong password: 401 with the field-scoped body
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "ana@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["errors"]["email"].is_array());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let (router, _dir) = test_router().await;
    register(&router, "ana@example.com").await;

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/users",
        None,
        Some(json!({
            "name": "Ana",
            "email": "ana@example.com",
            "password": "long-enough-secret",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn catalogue_reads_public_writes_protected() {
    let (router, _dir) = test_router().await;

    // Reads work without a token
    let (status, body) = send(&router, Method::GET, "/api/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Writes do not
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/products",
        None,
        Some(json!({"name": "Keyboard", "price": 10.0, "stock": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = register(&router, "ana@example.com").await;
    let id = create_product(&router, &token, "Keyboard", 49.99, 10).await;

    // The new product is publicly visible
    let (status, body) = send(&router, Method::GET, &format!("/api/products/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Keyboard");
    assert_eq!(body["stock"], 10);

    // Toggle active flag
    let (status, body) = send(
        &router,
        Method::PATCH,
        &format!("/api/products/{id}/status"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product"]["is_active"], false);
}

#[tokio::test]
async fn order_placement_flow() {
    let (router, _dir) = test_router().await;
    let token = register(&router, "ana@example.com").await;
    let id = create_product(&router, &token, "Keyboard", 100.0, 5).await;

    // Orders are protected
    let (status, _) = send(&router, Method::GET, "/api/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Place: 2 x 100.00
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({"products": [{"id": id, "quantity": 2}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let order = &body["order"];
    assert_eq!(order["total"], 200.0);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["items"][0]["quantity"], 2);
    assert_eq!(order["user"]["email"], "ana@example.com");
    let order_id = order["id"].as_str().unwrap().to_string();

    // Stock went 5 -> 3
    let (_, product) = send(&router, Method::GET, &format!("/api/products/{id}"), None, None).await;
    assert_eq!(product["stock"], 3);

    // Over-ask: 422, stock unchanged
    let (status, _) = send(
        &router,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({"products": [{"id": id, "quantity": 4}]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (_, product) = send(&router, Method::GET, &format!("/api/products/{id}"), None, None).await;
    assert_eq!(product["stock"], 3);

    // Status lifecycle
    let (status, _) = send(
        &router,
        Method::PATCH,
        &format!("/api/orders/{order_id}/status"),
        Some(&token),
        Some(json!({"status": "shipped"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        Method::PATCH,
        &format!("/api/orders/{order_id}/status"),
        Some(&token),
        Some(json!({"status": "delivered"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "delivered");

    // Delete, then 404
    let (status, _) = send(
        &router,
        Method::DELETE,
        &format!("/api/orders/{order_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &router,
        Method::GET,
        &format!("/api/orders/{order_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn logout_revokes_token() {
    let (router, _dir) = test_router().await;
    let token = register(&router, "ana@example.com").await;

    let (status, _) = send(&router, Method::GET, "/api/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&router, Method::POST, "/api/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // The same token is refused afterwards
    let (status, _) = send(&router, Method::GET, "/api/orders", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn orders_report_generates_download() {
    let (router, dir) = test_router().await;
    let token = register(&router, "ana@example.com").await;
    let id = create_product(&router, &token, "Keyboard", 100.0, 5).await;

    let (status, _) = send(
        &router,
        Method::POST,
        "/api/orders",
        Some(&token),
        Some(json!({"products": [{"id": id, "quantity": 1}]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    let (status, body) = send(
        &router,
        Method::POST,
        "/api/report/orders",
        Some(&token),
        Some(json!({"start_date": today, "end_date": today})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("/files/reports/"));

    // The workbook landed in the public tree
    let relative = url.strip_prefix("/files/").unwrap();
    assert!(dir.path().join("public").join(relative).exists());

    // And the static route serves it
    let (status, _) = send(&router, Method::GET, url, None, None).await;
    assert_eq!(status, StatusCode::OK);
}
