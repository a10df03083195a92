//! 用户服务：注册、资料维护与收藏

use super::credential_store::{CredentialStore, ProfileChanges};
use crate::{
    auth::PasswordHasher,
    config::SecurityConfig,
    error::AppError,
    models::user::*,
    repository::{CatalogStore, UserStore},
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct UserService {
    credentials: CredentialStore,
    users: Arc<dyn UserStore>,
    catalog: Arc<dyn CatalogStore>,
    policy: SecurityConfig,
}

impl UserService {
    pub fn new(
        credentials: CredentialStore,
        users: Arc<dyn UserStore>,
        catalog: Arc<dyn CatalogStore>,
        policy: SecurityConfig,
    ) -> Self {
        Self {
            credentials,
            users,
            catalog,
            policy,
        }
    }

    /// 注册新用户
    pub async fn register(&self, mut req: CreateUserRequest) -> Result<UserResponse, AppError> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, &self.policy)?;

        req.email = normalize_email(&req.email);
        if self.users.email_in_use(&req.email).await? {
            return Err(AppError::validation("Email is already in use"));
        }

        let user = self
            .credentials
            .create(&req.username, &req.password, &req.email, req.birthday)
            .await?;

        Ok(UserResponse::from(user))
    }

    /// 列出所有用户
    pub async fn list(&self) -> Result<Vec<UserResponse>, AppError> {
        let users = self.users.list_users().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    pub async fn get(&self, username: &str) -> Result<UserResponse, AppError> {
        self.credentials
            .find_by_username(username)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// 更新用户资料（调用方已通过所有权检查）
    pub async fn update(
        &self,
        username: &str,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        req.validate()?;
        if let Some(password) = req.password.as_deref() {
            PasswordHasher::validate_password_policy(password, &self.policy)?;
        }

        let changes = ProfileChanges {
            username: req.username,
            password: req.password,
            email: req.email.as_deref().map(normalize_email),
            birthday: req.birthday,
        };

        self.credentials
            .update(username, changes)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| AppError::not_found("User"))
    }

    /// 删除用户（收藏随之删除）
    pub async fn delete(&self, username: &str) -> Result<(), AppError> {
        if self.credentials.delete(username).await? {
            Ok(())
        } else {
            Err(AppError::not_found("User"))
        }
    }

    /// 获取用户及其收藏的完整影片信息
    pub async fn favorites(&self, username: &str) -> Result<UserFavoritesResponse, AppError> {
        let user = self
            .credentials
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let favorite_movies = self.catalog.find_movies_by_ids(&user.favorite_movies).await?;

        Ok(UserFavoritesResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            birthday: user.birthday,
            favorite_movies,
        })
    }

    /// 添加收藏，影片不存在时返回 404
    pub async fn add_favorite(
        &self,
        username: &str,
        movie_id: Uuid,
    ) -> Result<UserResponse, AppError> {
        let user = self
            .users
            .add_favorite(username, movie_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        tracing::debug!(username = %username, movie_id = %movie_id, "Favorite added");
        Ok(UserResponse::from(user))
    }

    pub async fn remove_favorite(
        &self,
        username: &str,
        movie_id: Uuid,
    ) -> Result<UserResponse, AppError> {
        let user = self
            .users
            .remove_favorite(username, movie_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        tracing::debug!(username = %username, movie_id = %movie_id, "Favorite removed");
        Ok(UserResponse::from(user))
    }
}
