//! JWT 认证中间件与提取器

use super::gate::{authenticate, AuthError};
use crate::{auth::jwt::JwtService, error::AppError, middleware::RequestId};
use axum::{
    extract::{FromRequestParts, Path, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

/// 认证上下文（附加到请求扩展）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub username: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

// 实现 FromRequestParts 以便在 handler 中直接提取 AuthContext
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Auth(AuthError::MissingToken))
    }
}

#[derive(Debug, Deserialize)]
struct OwnerPath {
    username: String,
}

/// 账户范围的资源守卫：令牌主体必须与路径中的 `{username}` 一致
#[derive(Debug, Clone)]
pub struct OwnerGuard {
    pub username: String,
    pub auth: AuthContext,
}

impl<S> FromRequestParts<S> for OwnerGuard
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;

        let Path(path) = Path::<OwnerPath>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(reason = %e.body_text(), "Invalid owner path");
                AppError::BadRequest("Invalid path".to_string())
            })?;

        auth.authorize_owner(&path.username)?;

        Ok(Self {
            username: path.username,
            auth,
        })
    }
}

/// 从 Authorization 头提取原始值
pub fn authorization_header(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// JWT 认证中间件 - 必须认证，失败时不会触达任何 handler
pub async fn jwt_auth_middleware(
    State(jwt_service): State<Arc<JwtService>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_context = authenticate(&jwt_service, authorization_header(req.headers()))
        .map_err(|e| {
            let request_id = req
                .extensions()
                .get::<RequestId>()
                .map(|id| id.0.as_str())
                .unwrap_or("-");
            tracing::debug!(
                reason = %e,
                uri = %req.uri().path(),
                request_id = %request_id,
                "Token rejected"
            );
            AppError::Auth(e)
        })?;

    tracing::debug!(username = %auth_context.username, "Token verified");

    // 附加到请求扩展
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_header_present() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer test_token_123".parse().unwrap());

        assert_eq!(authorization_header(&headers), Some("Bearer test_token_123"));
    }

    #[test]
    fn test_authorization_header_missing() {
        let headers = HeaderMap::new();
        assert!(authorization_header(&headers).is_none());
    }
}
