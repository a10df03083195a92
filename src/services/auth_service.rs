//! 认证服务：登录并签发令牌

use super::credential_store::CredentialStore;
use crate::{
    auth::JwtService,
    error::AppError,
    models::{auth::*, user::UserResponse},
};
use std::sync::Arc;

pub struct AuthService {
    credentials: CredentialStore,
    jwt_service: Arc<JwtService>,
}

impl AuthService {
    pub fn new(credentials: CredentialStore, jwt_service: Arc<JwtService>) -> Self {
        Self {
            credentials,
            jwt_service,
        }
    }

    /// 用户登录
    ///
    /// 未知用户与密码错误返回同一个 [`AppError::InvalidCredentials`]。
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = match self
            .credentials
            .verify_credentials(&req.username, &req.password)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                metrics::counter!("auth.login.failure").increment(1);
                return Err(e);
            }
        };

        // 生成令牌
        let token = self.jwt_service.issue(&user.username)?;

        metrics::counter!("auth.login.success").increment(1);
        tracing::info!(username = %user.username, "Login succeeded");

        Ok(LoginResponse {
            user: UserResponse::from(user),
            token,
        })
    }
}
