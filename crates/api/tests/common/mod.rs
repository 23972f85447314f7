#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

use atelier_api::auth::jwt::JwtConfig;
use atelier_api::config::ServerConfig;
use atelier_api::router::build_app_router;
use atelier_api::state::AppState;

pub const TEST_PASSWORD: &str = "salon_password_1";

/// Build a test `ServerConfig` with a fixed JWT secret and a fresh storage
/// directory under the system temp dir.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        public_base_url: "http://forms.test".to_string(),
        storage_root: std::env::temp_dir().join(format!("atelier-test-{}", uuid::Uuid::new_v4())),
        max_photo_bytes: 1024 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router, using the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_storage(pool).0
}

/// Like [`build_test_app`], also returning the photo storage root.
pub fn build_test_app_with_storage(pool: PgPool) -> (Router, PathBuf) {
    let config = test_config();
    std::fs::create_dir_all(&config.storage_root).unwrap();
    let storage_root = config.storage_root.clone();
    let state = AppState::new(pool, config.clone());
    (build_app_router(state, &config), storage_root)
}

/// Number of files below `dir`, recursively. A missing directory has none.
pub fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    json_request_auth(app, Method::POST, uri, body, token).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    json_request_auth(app, Method::PUT, uri, body, token).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request_auth(
    app: Router,
    method: Method,
    uri: &str,
    body: Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A registered salon owner with their first salon.
pub struct Owner {
    pub token: String,
    pub salon_id: i64,
}

/// Register a salon owner through the API.
pub async fn register_owner(app: Router, email: &str) -> Owner {
    let body = json!({
        "email": email,
        "password": TEST_PASSWORD,
        "salon_name": "Studio Lumen",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    Owner {
        token: json["access_token"].as_str().unwrap().to_string(),
        salon_id: json["salon"]["id"].as_i64().unwrap(),
    }
}

/// POST a JSON body as the owner and return the `data` of a 201 response.
pub async fn create_as(app: Router, owner: &Owner, path: &str, body: Value) -> Value {
    let uri = format!("/api/v1/salons/{}{path}", owner.salon_id);
    let response = post_json_auth(app, &uri, body, &owner.token).await;
    assert_eq!(
        response.status(),
        axum::http::StatusCode::CREATED,
        "POST {uri} should succeed"
    );
    body_json(response).await["data"].clone()
}

/// A form with one required text field.
pub fn form_body(name: &str) -> Value {
    json!({
        "name": name,
        "fields": [
            { "name": "full_name", "type": "text", "label": "Full name", "required": true },
            { "name": "notes", "type": "textarea", "label": "Notes" }
        ]
    })
}

/// A start time one week in the future, RFC 3339.
pub fn next_week() -> String {
    (chrono::Utc::now() + chrono::Duration::days(7)).to_rfc3339()
}
