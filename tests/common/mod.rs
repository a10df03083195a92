//! 测试公共模块
//! 提供测试配置、内存后端的应用实例和 HTTP 请求辅助函数

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use myflix_api::{
    config::{
        AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig, StorageBackend,
        StorageConfig,
    },
    middleware::AppState,
    repository::{CatalogStore, MemoryStore, UserStore},
    routes,
};
use secrecy::Secret;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";
pub const TEST_PASSWORD: &str = "Secret123!";

/// 种子数据中的影片 ID
pub const FIGHT_CLUB_ID: &str = "c3e8b7a6-1f2d-4c5b-9e8a-4d7f9a1b0001";
pub const SE7EN_ID: &str = "c3e8b7a6-1f2d-4c5b-9e8a-4d7f9a1b0002";
pub const INCEPTION_ID: &str = "c3e8b7a6-1f2d-4c5b-9e8a-4d7f9a1b0003";

pub fn seed_path() -> String {
    format!("{}/data/catalog.json", env!("CARGO_MANIFEST_DIR"))
}

/// 创建测试配置（内存后端）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
            body_limit_bytes: 64 * 1024,
        },
        storage: StorageConfig {
            backend: StorageBackend::Memory,
            catalog_seed_path: Some(seed_path()),
        },
        database: DatabaseConfig {
            url: std::env::var("TEST_DATABASE_URL").ok().map(Secret::new),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            jwt_secret: Secret::new(TEST_SECRET.to_string()),
            password_min_length: 8,
            password_require_uppercase: true,
            password_require_lowercase: true,
            password_require_digit: true,
            password_require_special: true,
            allowed_origins: vec!["http://localhost:1234".to_string()],
        },
    }
}

/// 创建测试应用状态（内存存储 + 种子目录）
pub fn create_test_app_state() -> Arc<AppState> {
    let store =
        Arc::new(MemoryStore::from_seed_file(seed_path()).expect("Failed to load catalog seed"));
    let users: Arc<dyn UserStore> = store.clone();
    let catalog: Arc<dyn CatalogStore> = store;

    Arc::new(
        AppState::new(create_test_config(), users, catalog, None)
            .expect("Failed to build app state"),
    )
}

pub fn create_test_app() -> Router {
    routes::create_router(create_test_app_state())
}

/// 测试响应
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

/// 发送请求
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();

    TestResponse {
        status,
        headers,
        body,
    }
}

/// 注册用户，返回响应
pub async fn register(app: &Router, username: &str, password: &str, email: &str) -> TestResponse {
    send(
        app,
        "POST",
        "/users",
        None,
        Some(json!({
            "Username": username,
            "Password": password,
            "Email": email,
            "Birthday": "1990-04-01"
        })),
    )
    .await
}

/// 登录，返回响应
pub async fn login(app: &Router, username: &str, password: &str) -> TestResponse {
    send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "Username": username, "Password": password })),
    )
    .await
}

/// 注册并登录，返回令牌
pub async fn register_and_login(app: &Router, username: &str) -> String {
    let email = format!("{}@example.com", username);
    let response = register(app, username, TEST_PASSWORD, &email).await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());

    let response = login(app, username, TEST_PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    response.json()["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}
