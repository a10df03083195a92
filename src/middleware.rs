//! HTTP 中间件与应用状态
//! 请求追踪（trace_id / request_id、日志、指标）

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::JwtService,
    config::AppConfig,
    error::AppError,
    repository::{CatalogStore, UserStore},
    services::{AuthService, CredentialStore, UserService},
};

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 当前请求的 request_id，由 [`request_tracking_middleware`] 写入请求扩展
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// 读取当前请求的 request_id；不在请求上下文中时返回 `None`
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 应用状态
///
/// 存储后端以 trait 对象持有，Postgres 与内存实现共用同一套服务。
pub struct AppState {
    pub config: AppConfig,
    /// 仅 Postgres 后端存在，用于就绪探针
    pub db: Option<sqlx::PgPool>,
    pub catalog: Arc<dyn CatalogStore>,
    pub jwt_service: Arc<JwtService>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub started_at: Instant,
}

impl AppState {
    /// 组装所有服务
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogStore>,
        db: Option<sqlx::PgPool>,
    ) -> Result<Self, AppError> {
        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let credentials = CredentialStore::new(users.clone())?;

        let auth_service = Arc::new(AuthService::new(credentials.clone(), jwt_service.clone()));
        let user_service = Arc::new(UserService::new(
            credentials,
            users,
            catalog.clone(),
            config.security.clone(),
        ));

        Ok(Self {
            config,
            db,
            catalog,
            jwt_service,
            auth_service,
            user_service,
            started_at: Instant::now(),
        })
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(mut req: Request, next: Next) -> Response {
    // 生成或提取 trace_id/request_id
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    // 创建 span
    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        // 错误响应体中的 request_id 与响应头一致
        let mut response = REQUEST_ID.scope(request_id.clone(), next.run(req)).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        metrics::counter!(
            "http_requests_total",
            "method" => method_label(&method),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            status = status,
            elapsed_ms = elapsed.as_millis() as u64,
            "Request completed"
        );

        // 在响应头中回传追踪标识
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 指标标签只使用有限集合
fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "OPTIONS" => "OPTIONS",
        _ => "OTHER",
    }
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
