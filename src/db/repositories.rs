//! Postgres-backed user repository.

use async_trait::async_trait;
use uuid::Uuid;

use super::{DbPool, UserStore};
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, ProfileUpdate, User};

const USER_COLUMNS: &str = "id, email, password_hash, display_name, bio, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let sql = format!(
            r#"
            INSERT INTO users (id, email, password_hash, display_name, bio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(&new_user.display_name)
            .bind(&new_user.bio)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => AppError::DuplicateEmail,
                other => AppError::Db(other),
            })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> AppResult<Option<User>> {
        let sql = format!(
            r#"
            UPDATE users SET
                display_name = CASE WHEN $2 THEN $3::TEXT ELSE display_name END,
                bio = CASE WHEN $4 THEN $5::TEXT ELSE bio END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(update.display_name.is_some())
            .bind(update.display_name.clone().flatten())
            .bind(update.bio.is_some())
            .bind(update.bio.clone().flatten())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}
