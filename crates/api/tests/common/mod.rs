#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use tower::ServiceExt;

use mj_api::auth::jwt::{generate_access_token, JwtConfig};
use mj_api::config::{Environment, ServerConfig};
use mj_api::router::build_app_router;
use mj_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret-with-enough-length";

/// Build a test `ServerConfig` with safe defaults and a throwaway upload root.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        upload_dir: temp_upload_dir(),
        max_upload_bytes: 1024 * 1024,
        db_max_connections: 2,
        environment: Environment::Development,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiry_hours: 1,
        },
    }
}

pub fn temp_upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("mj-api-test-{}", uuid::Uuid::new_v4().simple()))
}

/// Full application router (same middleware stack as production).
pub fn build_test_app(pool: MySqlPool) -> Router {
    let state = AppState::new(pool, test_config());
    build_app_router(state).expect("test router should build")
}

/// A pool that never connects: for routes that fail before touching the
/// database (auth rejection, validation).
pub fn lazy_pool() -> MySqlPool {
    MySqlPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("mysql://mj:mj@127.0.0.1:1/mj_unreachable")
        .expect("lazy pool URL should parse")
}

pub fn admin_token(user_id: i64) -> String {
    token(user_id, "admin")
}

pub fn user_token(user_id: i64) -> String {
    token(user_id, "user")
}

fn token(user_id: i64, role: &str) -> String {
    let config = JwtConfig {
        secret: TEST_SECRET.to_string(),
        expiry_hours: 1,
    };
    generate_access_token(user_id, role, &config).expect("token generation should succeed")
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    app.oneshot(request).await.expect("router is infallible")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Multipart body with one text field per `fields` entry and one image part
/// per `files` entry.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &[u8])],
    token: &str,
) -> Response {
    const BOUNDARY: &str = "mj-test-boundary";
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (file_name, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request should build");
    app.oneshot(request).await.expect("router is infallible")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected status for response");
}
