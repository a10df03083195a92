//! User repository (数据库访问层)

use super::{classify_write_error, StoreError, UserStore};
use crate::models::user::{NewUser, User, UserChanges};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// 收藏按插入顺序聚合为数组
const USER_COLUMNS: &str = r#"
    u.id, u.username, u.password_hash, u.email, u.birthday,
    ARRAY(
        SELECT f.movie_id FROM user_favorites f
        WHERE f.user_id = u.id
        ORDER BY f.id
    ) AS favorite_movies,
    u.created_at, u.updated_at
"#;

pub struct UserRepository {
    db: PgPool,
}

impl UserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users u WHERE u.id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    /// 根据用户名查找用户
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users u WHERE u.username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }

    /// 列出所有用户
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users u ORDER BY u.created_at, u.username",
            USER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(users)
    }

    /// 创建用户，唯一约束冲突由数据库判定
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, email, birthday)
            VALUES ($1, $2, $3, $4)
            RETURNING
                id, username, password_hash, email, birthday,
                ARRAY[]::uuid[] AS favorite_movies,
                created_at, updated_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.email)
        .bind(user.birthday)
        .fetch_one(&self.db)
        .await
        .map_err(|e| classify_write_error(e, "User"))?;

        Ok(created)
    }

    /// 更新用户
    async fn update_user(
        &self,
        username: &str,
        changes: UserChanges,
    ) -> Result<Option<User>, StoreError> {
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET
                username = COALESCE($2, username),
                password_hash = COALESCE($3, password_hash),
                email = COALESCE($4, email),
                birthday = COALESCE($5, birthday),
                updated_at = NOW()
            WHERE username = $1
            RETURNING id
            "#,
        )
        .bind(username)
        .bind(&changes.username)
        .bind(&changes.password_hash)
        .bind(&changes.email)
        .bind(changes.birthday)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| classify_write_error(e, "User"))?;

        match updated {
            Some(id) => self.find_by_id(id).await,
            None => Ok(None),
        }
    }

    /// 删除用户，收藏随外键级联删除
    async fn delete_user(&self, username: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn email_in_use(&self, email: &str) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(email) = LOWER(TRIM($1)))",
        )
        .bind(email)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }

    /// 添加收藏，已存在时保持原位置
    async fn add_favorite(
        &self,
        username: &str,
        movie_id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        let movie_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM movies WHERE id = $1)")
                .bind(movie_id)
                .fetch_one(&self.db)
                .await?;
        if !movie_exists {
            return Err(StoreError::MissingReference("Movie".to_string()));
        }

        sqlx::query(
            r#"
            INSERT INTO user_favorites (user_id, movie_id)
            SELECT u.id, $2 FROM users u WHERE u.username = $1
            ON CONFLICT (user_id, movie_id) DO NOTHING
            "#,
        )
        .bind(username)
        .bind(movie_id)
        .execute(&self.db)
        .await
        .map_err(|e| classify_write_error(e, "Movie"))?;

        self.find_user_by_username(username).await
    }

    /// 移除收藏
    async fn remove_favorite(
        &self,
        username: &str,
        movie_id: Uuid,
    ) -> Result<Option<User>, StoreError> {
        sqlx::query(
            r#"
            DELETE FROM user_favorites f
            USING users u
            WHERE f.user_id = u.id AND u.username = $1 AND f.movie_id = $2
            "#,
        )
        .bind(username)
        .bind(movie_id)
        .execute(&self.db)
        .await?;

        self.find_user_by_username(username).await
    }
}
