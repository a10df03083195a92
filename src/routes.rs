//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
};

use crate::{
    handlers::{self, catalog},
    middleware::AppState,
    models::catalog::{Actor, Director, Genre, Movie},
};

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    // 公开端点（首页、健康检查、登录、注册）
    let public_routes = Router::new()
        .route("/", get(handlers::health::welcome))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/login", post(handlers::auth::login))
        .route("/users", post(handlers::user::register));

    // 需要认证的路由
    let authenticated_routes = Router::new()
        // 影片目录
        .route("/movies", get(catalog::list::<Movie>))
        .route("/movies/{title}", get(catalog::show::<Movie>))
        .route("/genres", get(catalog::list::<Genre>))
        .route("/genres/{name}", get(catalog::show::<Genre>))
        .route("/directors", get(catalog::list::<Director>))
        .route("/directors/{name}", get(catalog::show::<Director>))
        .route("/actors", get(catalog::list::<Actor>))
        .route("/actors/{name}", get(catalog::show::<Actor>))
        // 用户（写操作与收藏仅限本人，由 OwnerGuard 检查）
        .route("/users", get(handlers::user::list_users))
        .route(
            "/users/{username}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route(
            "/users/{username}/favorites",
            get(handlers::user::list_favorites),
        )
        .route(
            "/users/{username}/favorites/{movie_id}",
            post(handlers::user::add_favorite).delete(handlers::user::remove_favorite),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.jwt_service.clone(),
            crate::auth::jwt_auth_middleware,
        ));

    let cors = cors_layer(&state.config.security.allowed_origins);
    let body_limit = state.config.server.body_limit_bytes;

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}

/// CORS 白名单；无法解析的来源会被忽略
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
}
