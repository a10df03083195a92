//! 影片目录的 HTTP 处理器
//!
//! 四类目录资源共用一组处理器，由 [`CatalogEntity`] 区分存储查询。

use crate::{
    error::AppError,
    middleware::AppState,
    models::catalog::{Actor, Director, Genre, Movie},
    repository::{CatalogStore, StoreError},
};
use axum::{
    extract::{Path, State},
    Json,
};
use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;

/// 可按名称查询的目录资源
pub trait CatalogEntity: Serialize + Send + Sized + 'static {
    /// 404 响应中的资源名
    const LABEL: &'static str;

    fn list(store: &dyn CatalogStore) -> BoxFuture<'_, Result<Vec<Self>, StoreError>>;

    fn find<'a>(
        store: &'a dyn CatalogStore,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<Self>, StoreError>>;
}

impl CatalogEntity for Movie {
    const LABEL: &'static str = "Movie";

    fn list(store: &dyn CatalogStore) -> BoxFuture<'_, Result<Vec<Self>, StoreError>> {
        store.list_movies()
    }

    fn find<'a>(
        store: &'a dyn CatalogStore,
        title: &'a str,
    ) -> BoxFuture<'a, Result<Option<Self>, StoreError>> {
        store.find_movie_by_title(title)
    }
}

impl CatalogEntity for Genre {
    const LABEL: &'static str = "Genre";

    fn list(store: &dyn CatalogStore) -> BoxFuture<'_, Result<Vec<Self>, StoreError>> {
        store.list_genres()
    }

    fn find<'a>(
        store: &'a dyn CatalogStore,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<Self>, StoreError>> {
        store.find_genre_by_name(name)
    }
}

impl CatalogEntity for Director {
    const LABEL: &'static str = "Director";

    fn list(store: &dyn CatalogStore) -> BoxFuture<'_, Result<Vec<Self>, StoreError>> {
        store.list_directors()
    }

    fn find<'a>(
        store: &'a dyn CatalogStore,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<Self>, StoreError>> {
        store.find_director_by_name(name)
    }
}

impl CatalogEntity for Actor {
    const LABEL: &'static str = "Actor";

    fn list(store: &dyn CatalogStore) -> BoxFuture<'_, Result<Vec<Self>, StoreError>> {
        store.list_actors()
    }

    fn find<'a>(
        store: &'a dyn CatalogStore,
        name: &'a str,
    ) -> BoxFuture<'a, Result<Option<Self>, StoreError>> {
        store.find_actor_by_name(name)
    }
}

/// 列出全部资源
pub async fn list<E: CatalogEntity>(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<E>>, AppError> {
    let items = E::list(state.catalog.as_ref()).await?;
    Ok(Json(items))
}

/// 按标题或名称查询单个资源（区分大小写）
pub async fn show<E: CatalogEntity>(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<E>, AppError> {
    E::find(state.catalog.as_ref(), &key)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(E::LABEL))
}
