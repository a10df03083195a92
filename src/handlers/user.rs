//! 用户管理的 HTTP 处理器

use crate::{
    auth::OwnerGuard,
    error::AppError,
    middleware::AppState,
    models::user::*,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// 收藏路径中的影片 ID；用户名由 [`OwnerGuard`] 读取
#[derive(Debug, Deserialize)]
pub struct FavoritePath {
    pub movie_id: Uuid,
}

fn invalid_movie_id(rejection: PathRejection) -> AppError {
    tracing::debug!(reason = %rejection.body_text(), "Invalid favorite path");
    AppError::BadRequest("Movie id must be a UUID".to_string())
}

/// 注册用户（公开）
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Json(req) = payload?;
    let user = state.user_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 列出用户
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    Ok(Json(state.user_service.list().await?))
}

/// 获取用户详情
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    Ok(Json(state.user_service.get(&username).await?))
}

/// 更新用户资料（仅限本人）
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Json(req) = payload?;
    let user = state.user_service.update(&owner.username, req).await?;
    Ok(Json(user))
}

/// 删除用户（仅限本人）
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
) -> Result<String, AppError> {
    state.user_service.delete(&owner.username).await?;
    Ok(format!("{} was deleted", owner.username))
}

/// 获取收藏列表（仅限本人）
pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
) -> Result<Json<UserFavoritesResponse>, AppError> {
    Ok(Json(state.user_service.favorites(&owner.username).await?))
}

/// 添加收藏（仅限本人）
pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
    path: Result<Path<FavoritePath>, PathRejection>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let Path(path) = path.map_err(invalid_movie_id)?;
    let user = state
        .user_service
        .add_favorite(&owner.username, path.movie_id)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 移除收藏（仅限本人）
pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
    path: Result<Path<FavoritePath>, PathRejection>,
) -> Result<Json<UserResponse>, AppError> {
    let Path(path) = path.map_err(invalid_movie_id)?;
    let user = state
        .user_service
        .remove_favorite(&owner.username, path.movie_id)
        .await?;
    Ok(Json(user))
}
