use amanah_server::{
    api::app_router,
    build_state,
    config::{BootstrapOwner, Config},
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, Response},
};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

const OWNER_EMAIL: &str = "owner@amanah.test";
const OWNER_PASSWORD: &str = "owner-secret";

async fn build_test_router() -> (axum::Router, TempDir) {
    let tmp = tempdir().unwrap();
    let mut config = Config::for_database(tmp.path().join("test.db").to_string_lossy());
    config.bootstrap_owner = Some(BootstrapOwner {
        email: OWNER_EMAIL.to_string(),
        password: OWNER_PASSWORD.to_string(),
        name: "Owner".to_string(),
    });
    let state = build_state(&config).await.unwrap();
    (app_router(state, &config), tmp)
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &axum::Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body = json_body(response).await;
    assert_eq!(body["tokenType"], "Bearer");
    body["accessToken"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public_and_api_requires_token() {
    let (app, _tmp) = build_test_router().await;

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/healthz", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/packages", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .clone()
        .oneshot(request(
            Method::GET,
            "/api/v1/packages",
            Some("not-a-token"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn login_rejects_bad_password_and_accepts_good_one() {
    let (app, _tmp) = build_test_router().await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": OWNER_EMAIL, "password": "wrong-password" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let token = login(&app, OWNER_EMAIL, OWNER_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let me = json_body(response).await;
    assert_eq!(me["email"], OWNER_EMAIL);
    assert_eq!(me["role"], "owner");
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn roles_gate_finance_routes() {
    let (app, _tmp) = build_test_router().await;
    let owner = login(&app, OWNER_EMAIL, OWNER_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/users",
            Some(&owner),
            Some(json!({
                "email": "staff@amanah.test",
                "name": "Staff",
                "role": "user",
                "password": "staff-password"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let staff = login(&app, "staff@amanah.test", "staff-password").await;

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/transactions", Some(&staff), None))
        .await
        .unwrap();
    assert_eq!(response.status(), 403);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/packages", Some(&staff), None))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .clone()
        .oneshot(request(Method::GET, "/api/v1/users", Some(&staff), None))
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn short_passwords_are_rejected() {
    let (app, _tmp) = build_test_router().await;
    let owner = login(&app, OWNER_EMAIL, OWNER_PASSWORD).await;

    let response = app
        .clone()
        .oneshot(request(
            Method::POST,
            "/api/v1/users",
            Some(&owner),
            Some(json!({
                "email": "short@amanah.test",
                "name": "Short",
                "role": "admin",
                "password": "abc"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn owner_cannot_deactivate_themselves() {
    let (app, _tmp) = build_test_router().await;
    let owner = login(&app, OWNER_EMAIL, OWNER_PASSWORD).await;

    let me = json_body(
        app.clone()
            .oneshot(request(Method::GET, "/api/v1/auth/me", Some(&owner), None))
            .await
            .unwrap(),
    )
    .await;
    let id = me["id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(request(
            Method::PUT,
            &format!("/api/v1/users/{}", id),
            Some(&owner),
            Some(json!({ "isActive": false })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}
