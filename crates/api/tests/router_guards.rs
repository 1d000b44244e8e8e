//! Router-level tests that never reach the database.
//!
//! The pool points at a closed port, so every request here must be decided
//! by extractors, validation, or the middleware stack. Admin routes confirm
//! the account in the database first, so their validation is exercised in
//! `api_flows.rs`.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    admin_token, body_json, build_test_app, get, get_auth, lazy_pool, post_json_auth, send,
    user_token,
};
use serde_json::json;

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let app = build_test_app(lazy_pool());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
}

#[tokio::test]
async fn missing_token_is_401() {
    let app = build_test_app(lazy_pool());
    let response = get(app, "/api/mj-project").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Missing Authorization header");
}

#[tokio::test]
async fn malformed_and_forged_tokens_are_401() {
    let app = build_test_app(lazy_pool());
    let response = send(
        app.clone(),
        Method::GET,
        "/api/packing-list",
        Some("not-a-jwt"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let forged = {
        let config = mj_api::auth::jwt::JwtConfig {
            secret: "some-other-secret".into(),
            expiry_hours: 1,
        };
        mj_api::auth::jwt::generate_access_token(1, "admin", &config).unwrap()
    };
    let response = get_auth(app, "/api/finance/summary", &forged).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admin_cannot_write() {
    let app = build_test_app(lazy_pool());
    let token = user_token(5);

    let cases = [
        (Method::POST, "/api/mj-project", Some(json!({"name": "A", "quantity": 1}))),
        (Method::PATCH, "/api/mj-project/1", Some(json!({"name": "B"}))),
        (Method::DELETE, "/api/mj-project/1", None),
        (Method::GET, "/api/finance/summary", None),
        (Method::GET, "/api/users", None),
        (Method::POST, "/api/packing-list/auto-save", Some(json!({}))),
        (Method::PUT, "/api/logistic-payment/update", Some(json!({"payments": []}))),
        (Method::DELETE, "/api/warehouse/entries/3", None),
    ];

    for (method, uri, body) in cases {
        let response = send(app.clone(), method.clone(), uri, Some(&token), body).await;
        assert_eq!(
            response.status(),
            StatusCode::FORBIDDEN,
            "{method} {uri} should be admin only"
        );
    }
}

#[tokio::test]
async fn calendar_rejects_inverted_range() {
    let app = build_test_app(lazy_pool());
    let response = get_auth(
        app,
        "/api/mj-project/calendar?from=2024-06-30&to=2024-06-01",
        &user_token(2),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn admin_routes_fail_closed_when_account_cannot_be_checked() {
    let app = build_test_app(lazy_pool());
    let response = post_json_auth(
        app,
        "/api/mj-project",
        json!({ "name": "Keyring", "quantity": 10 }),
        &admin_token(1),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = build_test_app(lazy_pool());
    let response = get(app, "/api/does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
