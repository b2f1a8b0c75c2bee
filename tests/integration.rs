//! Integration tests: register, login, profile, protected route, logout.
//!
//! Run with `cargo test`. The in-memory store backs most tests; the Postgres
//! round trip needs `TEST_DATABASE_URL`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use profiled::auth::TokenService;
use profiled::db::{self, MemoryUserStore, PgUserStore, UserStore};
use profiled::{create_app, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

const SECRET: &str = "integration-test-secret";

fn memory_app() -> (axum::Router, MemoryUserStore) {
    let store = MemoryUserStore::new();
    let shared: Arc<dyn UserStore> = Arc::new(store.clone());
    let state = AppState::new(shared, TokenService::new(SECRET, 60));
    (create_app(state), store)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        req = req.header("authorization", format!("Bearer {}", token));
    }
    let req = match body {
        Some(body) => req
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn send_raw_auth(app: &axum::Router, uri: &str, header: &str) -> StatusCode {
    let req = Request::builder()
        .uri(uri)
        .header("authorization", header)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(req).await.unwrap().status()
}

async fn register_and_login(app: &axum::Router, email: &str) -> (Value, String) {
    let (status, profile) = send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({ "email": email, "password": "longenough1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, grant) = send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": email, "password": "longenough1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = grant["access_token"].as_str().unwrap().to_string();
    (profile, token)
}

#[tokio::test]
async fn health_returns_ok() {
    let (app, _) = memory_app();
    let (status, json) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
}

#[tokio::test]
async fn end_to_end_profile_flow() {
    let (app, _) = memory_app();

    let (status, profile) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "email": "u@example.com", "password": "longenough1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(profile["id"].is_string());
    assert_eq!(profile["email"], "u@example.com");
    assert!(profile["display_name"].is_null());
    assert!(profile["bio"].is_null());
    assert!(profile.get("password_hash").is_none());
    assert!(profile.get("password").is_none());

    let (status, grant) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "u@example.com", "password": "longenough1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grant["token_type"], "Bearer");
    assert_eq!(grant["expires_in_minutes"], 60);
    let token = grant["access_token"].as_str().unwrap();

    let (status, fetched) = send(&app, "GET", "/profile", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, profile);

    let (status, updated) = send(
        &app,
        "PUT",
        "/profile",
        Some(token),
        Some(json!({ "display_name": "U" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["display_name"], "U");
    assert!(updated["bio"].is_null());
    assert_eq!(updated["id"], profile["id"]);

    let (status, message) = send(&app, "GET", "/protected", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(message["message"].as_str().unwrap().contains("u@example.com"));

    let (status, body) = send(&app, "GET", "/protected", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);
}

#[tokio::test]
async fn duplicate_email_case_variant_conflicts() {
    let (app, _) = memory_app();
    let first = json!({ "email": "A@x.com", "password": "longenough1" });
    let second = json!({ "email": "a@x.com", "password": "longenough2" });
    let (status, _) = send(&app, "POST", "/register", None, Some(first)).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = send(&app, "POST", "/register", None, Some(second)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn register_validation_errors() {
    let (app, _) = memory_app();
    let (status, body) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "short" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].get("email").is_some());
    assert!(body["details"].get("password").is_some());

    let (status, _) = send(&app, "POST", "/register", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_rejections_look_the_same() {
    let (app, _) = memory_app();
    register_and_login(&app, "u@example.com").await;

    let (s1, wrong_password) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "u@example.com", "password": "wrong-password" })),
    )
    .await;
    let (s2, unknown_email) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "longenough1" })),
    )
    .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn protected_rejects_bad_authorization() {
    let (app, store) = memory_app();
    let (profile, token) = register_and_login(&app, "u@example.com").await;

    assert_eq!(send_raw_auth(&app, "/protected", "Token abc").await, StatusCode::UNAUTHORIZED);
    assert_eq!(send_raw_auth(&app, "/protected", "Bearer ").await, StatusCode::UNAUTHORIZED);

    let foreign = TokenService::new("another-secret", 60)
        .issue(profile["id"].as_str().unwrap())
        .unwrap();
    assert_eq!(
        send_raw_auth(&app, "/protected", &format!("Bearer {}", foreign)).await,
        StatusCode::UNAUTHORIZED
    );

    let id = profile["id"].as_str().unwrap().parse().unwrap();
    store.remove(id).await;
    let (status, body) = send(&app, "GET", "/profile", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not found for token");
}

#[tokio::test]
async fn logout_leaves_token_usable() {
    let (app, _) = memory_app();
    let (_, token) = register_and_login(&app, "u@example.com").await;
    let (status, body) = send(&app, "POST", "/logout", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("client should delete token"));

    let (status, _) = send(&app, "GET", "/profile", Some(token.as_str()), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn profile_update_clears_and_validates() {
    let (app, _) = memory_app();
    let (_, token) = register_and_login(&app, "u@example.com").await;

    let (status, updated) = send(
        &app,
        "PUT",
        "/profile",
        Some(token.as_str()),
        Some(json!({ "display_name": "U", "bio": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["bio"], "hello");

    let (status, cleared) = send(
        &app,
        "PUT",
        "/profile",
        Some(token.as_str()),
        Some(json!({ "bio": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["display_name"], "U");
    assert!(cleared["bio"].is_null());

    let (status, _) = send(
        &app,
        "PUT",
        "/profile",
        Some(token.as_str()),
        Some(json!({ "bio": "b".repeat(1001) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (app, _) = memory_app();
    let (status, body) = send(&app, "GET", "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn wrong_method_is_json_405() {
    let (app, _) = memory_app();
    let (status, body) = send(&app, "DELETE", "/profile", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        body,
        json!({ "code": 405, "error": "Method Not Allowed", "message": "Method not allowed" })
    );

    let (status, body) = send(&app, "GET", "/login", None, None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], 405);
}

#[tokio::test]
async fn postgres_register_and_login() {
    let database_url = match std::env::var("TEST_DATABASE_URL") {
        Ok(u) => u,
        Err(_) => {
            eprintln!("Skip postgres test: set TEST_DATABASE_URL");
            return;
        }
    };
    let pool = match db::create_pool(&database_url).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Skip postgres test: {}", e);
            return;
        }
    };
    db::init_schema(&pool).await.unwrap();
    let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool));
    let app = create_app(AppState::new(store, TokenService::new(SECRET, 60)));

    let email = format!(
        "test-{}@example.com",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    );
    let (_, token) = register_and_login(&app, &email).await;

    let (status, _) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "email": email.to_uppercase(), "password": "longenough1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send(
        &app,
        "PUT",
        "/profile",
        Some(token.as_str()),
        Some(json!({ "display_name": "Pg" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["display_name"], "Pg");
}
