//! 认证相关的 HTTP 处理器

use crate::{
    error::AppError,
    middleware::AppState,
    models::auth::{LoginRequest, LoginResponse},
};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

/// 用户登录，成功时返回用户信息与令牌
///
/// 请求体缺失或格式错误与凭据错误同样处理。
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload.map_err(|e| {
        tracing::debug!(reason = %e.body_text(), "Malformed login request");
        AppError::InvalidCredentials
    })?;

    let response = state.auth_service.login(req).await?;
    Ok(Json(response))
}
