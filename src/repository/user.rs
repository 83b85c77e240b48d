use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::not_found;
use crate::error::AppError;
use crate::models::{Artist, User};

/// Insert a new user; duplicate email or username surfaces as a
/// unique-constraint violation.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, password_hash, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id, username, email
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT id, username, email FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found("user"))
}

pub async fn update_username(
    pool: &PgPool,
    user_id: Uuid,
    username: &str,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET username = $1, updated_at = $2
        WHERE id = $3
        RETURNING id, username, email
        "#,
    )
    .bind(username)
    .bind(Utc::now())
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found("user"))
}

/// Delete the user; follows, playlists and the refresh token cascade.
pub async fn delete_user(pool: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found("user"));
    }
    Ok(())
}

/// Follow an artist. Following twice is a no-op.
pub async fn follow_artist(pool: &PgPool, user_id: Uuid, artist_id: Uuid) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO artists_users (user_id, artist_id, followed_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, artist_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(artist_id)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn followed_artists(pool: &PgPool, user_id: Uuid) -> Result<Vec<Artist>, AppError> {
    let artists = sqlx::query_as::<_, Artist>(
        r#"
        SELECT a.id, a.name, a.description
        FROM artists a
        JOIN artists_users au ON au.artist_id = a.id
        WHERE au.user_id = $1
        ORDER BY au.followed_at, a.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(artists)
}
