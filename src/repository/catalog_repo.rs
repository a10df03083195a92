//! Catalog repository (目录数据访问)
//!
//! 关联数据在 SQL 中聚合为 JSON，键名与对外格式一致，直接反序列化为嵌套结构。

use super::{classify_write_error, CatalogStore, StoreError};
use crate::models::catalog::{
    Actor, ActorCredit, CastMember, CatalogSeed, Director, Genre, Movie, MovieRef, PersonRef,
};
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

const MOVIE_SELECT: &str = r#"
    SELECT
        m.id, m.title, m.release_year, m.description,
        g.id AS genre_id, g.name AS genre_name, g.description AS genre_description,
        d.id AS director_id, d.name AS director_name,
        COALESCE(
            (SELECT json_agg(json_build_object('_id', a.id, 'Name', a.name, 'Role', c.role)
                             ORDER BY c.ordinal, a.name)
             FROM movie_cast c JOIN actors a ON a.id = c.actor_id
             WHERE c.movie_id = m.id),
            '[]'::json
        ) AS actors,
        m.image_path, m.featured
    FROM movies m
    JOIN genres g ON g.id = m.genre_id
    JOIN directors d ON d.id = m.director_id
"#;

const DIRECTOR_SELECT: &str = r#"
    SELECT
        d.id, d.name, d.bio, d.birth_year, d.death_year,
        COALESCE(
            (SELECT json_agg(json_build_object('_id', m.id, 'Title', m.title) ORDER BY m.title)
             FROM movies m WHERE m.director_id = d.id),
            '[]'::json
        ) AS movies
    FROM directors d
"#;

const ACTOR_SELECT: &str = r#"
    SELECT
        a.id, a.name, a.birth_year, a.death_year,
        COALESCE(
            (SELECT json_agg(json_build_object(
                        'Movie', json_build_object('_id', m.id, 'Title', m.title),
                        'Role', c.role)
                    ORDER BY m.title)
             FROM movie_cast c JOIN movies m ON m.id = c.movie_id
             WHERE c.actor_id = a.id),
            '[]'::json
        ) AS movies
    FROM actors a
"#;

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    release_year: String,
    description: String,
    genre_id: Uuid,
    genre_name: String,
    genre_description: String,
    director_id: Uuid,
    director_name: String,
    actors: Json<Vec<CastMember>>,
    image_path: Option<String>,
    featured: bool,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            release_year: row.release_year,
            description: row.description,
            genre: Genre {
                id: row.genre_id,
                name: row.genre_name,
                description: row.genre_description,
            },
            director: PersonRef {
                id: row.director_id,
                name: row.director_name,
            },
            actors: row.actors.0,
            image_path: row.image_path,
            featured: row.featured,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DirectorRow {
    id: Uuid,
    name: String,
    bio: String,
    birth_year: String,
    death_year: Option<String>,
    movies: Json<Vec<MovieRef>>,
}

impl From<DirectorRow> for Director {
    fn from(row: DirectorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            bio: row.bio,
            birth_year: row.birth_year,
            death_year: row.death_year,
            movies: row.movies.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ActorRow {
    id: Uuid,
    name: String,
    birth_year: String,
    death_year: Option<String>,
    movies: Json<Vec<ActorCredit>>,
}

impl From<ActorRow> for Actor {
    fn from(row: ActorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            birth_year: row.birth_year,
            death_year: row.death_year,
            movies: row.movies.0,
        }
    }
}

pub struct CatalogRepository {
    db: PgPool,
}

impl CatalogRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 导入目录种子数据（幂等，已存在的记录保持不变）
    ///
    /// 在单个事务中执行；悬空引用触发外键错误并整体回滚。
    pub async fn import_seed(&self, seed: &CatalogSeed) -> Result<(), StoreError> {
        let mut tx = self.db.begin().await?;

        for genre in &seed.genres {
            sqlx::query(
                "INSERT INTO genres (id, name, description) VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING",
            )
            .bind(genre.id)
            .bind(&genre.name)
            .bind(&genre.description)
            .execute(&mut *tx)
            .await?;
        }

        for director in &seed.directors {
            sqlx::query(
                r#"
                INSERT INTO directors (id, name, bio, birth_year, death_year)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(director.id)
            .bind(&director.name)
            .bind(&director.bio)
            .bind(&director.birth_year)
            .bind(&director.death_year)
            .execute(&mut *tx)
            .await?;
        }

        for actor in &seed.actors {
            sqlx::query(
                r#"
                INSERT INTO actors (id, name, birth_year, death_year)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(actor.id)
            .bind(&actor.name)
            .bind(&actor.birth_year)
            .bind(&actor.death_year)
            .execute(&mut *tx)
            .await?;
        }

        for movie in &seed.movies {
            sqlx::query(
                r#"
                INSERT INTO movies
                    (id, title, release_year, description, genre_id, director_id, image_path, featured)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(movie.id)
            .bind(&movie.title)
            .bind(&movie.release_year)
            .bind(&movie.description)
            .bind(movie.genre)
            .bind(movie.director)
            .bind(&movie.image_path)
            .bind(movie.featured)
            .execute(&mut *tx)
            .await
            .map_err(|e| classify_write_error(e, &format!("Genre or director of {}", movie.title)))?;

            for (ordinal, credit) in movie.cast.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO movie_cast (movie_id, actor_id, role, ordinal)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (movie_id, actor_id) DO NOTHING
                    "#,
                )
                .bind(movie.id)
                .bind(credit.actor)
                .bind(&credit.role)
                .bind(ordinal as i32)
                .execute(&mut *tx)
                .await
                .map_err(|e| classify_write_error(e, &format!("Actor {}", credit.actor)))?;
            }
        }

        tx.commit().await?;

        tracing::info!(
            genres = seed.genres.len(),
            directors = seed.directors.len(),
            actors = seed.actors.len(),
            movies = seed.movies.len(),
            "Catalog seed imported"
        );
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        let rows = sqlx::query_as::<_, MovieRow>(&format!("{} ORDER BY m.title", MOVIE_SELECT))
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError> {
        let row = sqlx::query_as::<_, MovieRow>(&format!("{} WHERE m.title = $1", MOVIE_SELECT))
            .bind(title)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Movie::from))
    }

    async fn find_movies_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Movie>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MovieRow>(&format!("{} WHERE m.id = ANY($1)", MOVIE_SELECT))
            .bind(ids)
            .fetch_all(&self.db)
            .await?;

        // 按传入顺序返回
        let mut movies: Vec<Movie> = rows.into_iter().map(Movie::from).collect();
        movies.sort_by_key(|m| ids.iter().position(|id| *id == m.id));
        Ok(movies)
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, StoreError> {
        let genres = sqlx::query_as::<_, Genre>(
            "SELECT id, name, description FROM genres ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(genres)
    }

    async fn find_genre_by_name(&self, name: &str) -> Result<Option<Genre>, StoreError> {
        let genre = sqlx::query_as::<_, Genre>(
            "SELECT id, name, description FROM genres WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await?;

        Ok(genre)
    }

    async fn list_directors(&self) -> Result<Vec<Director>, StoreError> {
        let rows =
            sqlx::query_as::<_, DirectorRow>(&format!("{} ORDER BY d.name", DIRECTOR_SELECT))
                .fetch_all(&self.db)
                .await?;

        Ok(rows.into_iter().map(Director::from).collect())
    }

    async fn find_director_by_name(&self, name: &str) -> Result<Option<Director>, StoreError> {
        let row =
            sqlx::query_as::<_, DirectorRow>(&format!("{} WHERE d.name = $1", DIRECTOR_SELECT))
                .bind(name)
                .fetch_optional(&self.db)
                .await?;

        Ok(row.map(Director::from))
    }

    async fn list_actors(&self) -> Result<Vec<Actor>, StoreError> {
        let rows = sqlx::query_as::<_, ActorRow>(&format!("{} ORDER BY a.name", ACTOR_SELECT))
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Actor::from).collect())
    }

    async fn find_actor_by_name(&self, name: &str) -> Result<Option<Actor>, StoreError> {
        let row = sqlx::query_as::<_, ActorRow>(&format!("{} WHERE a.name = $1", ACTOR_SELECT))
            .bind(name)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Actor::from))
    }
}
