use sqlx::PgPool;
use uuid::Uuid;

use super::{not_found, track::TRACK_COLUMNS, Filter};
use crate::error::AppError;
use crate::models::{Artist, Track};

/// Columns a listing may sort artists by
pub const SORTABLE: &[&str] = &["name"];

pub async fn create_artist(pool: &PgPool, name: &str, description: &str) -> Result<Artist, AppError> {
    let artist = sqlx::query_as::<_, Artist>(
        "INSERT INTO artists (id, name, description) VALUES ($1, $2, $3) RETURNING id, name, description",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await?;

    Ok(artist)
}

pub async fn get_artist(pool: &PgPool, artist_id: Uuid) -> Result<Artist, AppError> {
    sqlx::query_as::<_, Artist>("SELECT id, name, description FROM artists WHERE id = $1")
        .bind(artist_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found("artist"))
}

/// Page through artists, optionally full-text matching on name
pub async fn list_artists(pool: &PgPool, filter: &Filter) -> Result<Vec<Artist>, AppError> {
    // order_by() only ever renders allow-listed column names
    let query = format!(
        r#"
        SELECT id, name, description
        FROM artists
        WHERE ($1 = '' OR to_tsvector('simple', name) @@ plainto_tsquery('simple', $1))
        ORDER BY {}
        LIMIT $2 OFFSET $3
        "#,
        filter.order_by()
    );

    let artists = sqlx::query_as::<_, Artist>(&query)
        .bind(&filter.name)
        .bind(filter.limit)
        .bind(filter.offset())
        .fetch_all(pool)
        .await?;

    Ok(artists)
}

pub async fn update_artist(pool: &PgPool, artist: &Artist) -> Result<Artist, AppError> {
    sqlx::query_as::<_, Artist>(
        "UPDATE artists SET name = $1, description = $2 WHERE id = $3 RETURNING id, name, description",
    )
    .bind(&artist.name)
    .bind(&artist.description)
    .bind(artist.id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| not_found("artist"))
}

pub async fn delete_artist(pool: &PgPool, artist_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM artists WHERE id = $1")
        .bind(artist_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found("artist"));
    }
    Ok(())
}

/// Tracks credited to the artist; 404 when the artist itself is unknown
pub async fn tracks_of_artist(pool: &PgPool, artist_id: Uuid) -> Result<Vec<Track>, AppError> {
    get_artist(pool, artist_id).await?;

    let query = format!(
        r#"
        SELECT {}
        FROM tracks t
        LEFT JOIN artists_tracks art ON art.track_id = t.id
        WHERE t.id IN (SELECT track_id FROM artists_tracks WHERE artist_id = $1)
        GROUP BY t.id
        ORDER BY t.name, t.id
        "#,
        TRACK_COLUMNS
    );

    let tracks = sqlx::query_as::<_, Track>(&query)
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

    Ok(tracks)
}
