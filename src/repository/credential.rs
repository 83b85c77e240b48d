/// Credential store: password digests and the single live refresh token per
/// user.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// A user's identity and password digest
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credential {
    pub user_id: Uuid,
    pub password_hash: String,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AppError>;

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<Credential>, AppError>;

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str)
        -> Result<(), AppError>;

    /// The stored refresh token value for `user_id`, if any
    async fn refresh_token(&self, user_id: Uuid) -> Result<Option<String>, AppError>;

    /// Replace whatever refresh token `user_id` had (last write wins)
    async fn save_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError>;
}

pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>, AppError> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id AS user_id, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<Credential>, AppError> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id AS user_id, password_hash FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn update_password_hash(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn refresh_token(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        let token = sqlx::query_scalar::<_, String>(
            "SELECT token FROM refresh_tokens WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn save_refresh_token(&self, user_id: Uuid, token: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET token = EXCLUDED.token, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
