/// User playlists
///
/// Every operation is scoped by the owning user id, so a playlist owned by
/// someone else behaves exactly like a missing one.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{not_found, track::TRACK_COLUMNS};
use crate::error::AppError;
use crate::models::{Playlist, Track};

const PLAYLIST_COLUMNS: &str = "p.id, p.name, p.user_id, \
     COALESCE(array_agg(pt.track_id ORDER BY pt.added_at, pt.track_id) \
     FILTER (WHERE pt.track_id IS NOT NULL), '{}'::uuid[]) AS track_ids";

pub async fn create_playlist(pool: &PgPool, user_id: Uuid, name: &str) -> Result<Playlist, AppError> {
    let playlist_id = Uuid::new_v4();

    sqlx::query("INSERT INTO playlists (id, name, user_id, created_at) VALUES ($1, $2, $3, $4)")
        .bind(playlist_id)
        .bind(name)
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;

    get_playlist(pool, user_id, playlist_id).await
}

pub async fn list_playlists(pool: &PgPool, user_id: Uuid) -> Result<Vec<Playlist>, AppError> {
    let query = format!(
        r#"
        SELECT {}
        FROM playlists p
        LEFT JOIN playlists_tracks pt ON pt.playlist_id = p.id
        WHERE p.user_id = $1
        GROUP BY p.id
        ORDER BY p.created_at, p.id
        "#,
        PLAYLIST_COLUMNS
    );

    let playlists = sqlx::query_as::<_, Playlist>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(playlists)
}

pub async fn get_playlist(
    pool: &PgPool,
    user_id: Uuid,
    playlist_id: Uuid,
) -> Result<Playlist, AppError> {
    let query = format!(
        r#"
        SELECT {}
        FROM playlists p
        LEFT JOIN playlists_tracks pt ON pt.playlist_id = p.id
        WHERE p.id = $1 AND p.user_id = $2
        GROUP BY p.id
        "#,
        PLAYLIST_COLUMNS
    );

    sqlx::query_as::<_, Playlist>(&query)
        .bind(playlist_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found("playlist"))
}

pub async fn delete_playlist(pool: &PgPool, user_id: Uuid, playlist_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = $1 AND user_id = $2")
        .bind(playlist_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found("playlist"));
    }
    Ok(())
}

/// Append tracks; ones already on the playlist are skipped
pub async fn add_tracks(
    pool: &PgPool,
    user_id: Uuid,
    playlist_id: Uuid,
    track_ids: &[Uuid],
) -> Result<Playlist, AppError> {
    get_playlist(pool, user_id, playlist_id).await?;

    sqlx::query(
        r#"
        INSERT INTO playlists_tracks (playlist_id, track_id, added_at)
        SELECT $1, track_id, $3 FROM unnest($2::uuid[]) AS track_id
        ON CONFLICT (playlist_id, track_id) DO NOTHING
        "#,
    )
    .bind(playlist_id)
    .bind(track_ids)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    get_playlist(pool, user_id, playlist_id).await
}

pub async fn remove_tracks(
    pool: &PgPool,
    user_id: Uuid,
    playlist_id: Uuid,
    track_ids: &[Uuid],
) -> Result<Playlist, AppError> {
    get_playlist(pool, user_id, playlist_id).await?;

    sqlx::query("DELETE FROM playlists_tracks WHERE playlist_id = $1 AND track_id = ANY($2)")
        .bind(playlist_id)
        .bind(track_ids)
        .execute(pool)
        .await?;

    get_playlist(pool, user_id, playlist_id).await
}

pub async fn playlist_tracks(
    pool: &PgPool,
    user_id: Uuid,
    playlist_id: Uuid,
) -> Result<Vec<Track>, AppError> {
    get_playlist(pool, user_id, playlist_id).await?;

    let query = format!(
        r#"
        SELECT {}
        FROM playlists_tracks pt
        JOIN tracks t ON t.id = pt.track_id
        LEFT JOIN artists_tracks art ON art.track_id = t.id
        WHERE pt.playlist_id = $1
        GROUP BY t.id, pt.added_at
        ORDER BY pt.added_at, t.id
        "#,
        TRACK_COLUMNS
    );

    let tracks = sqlx::query_as::<_, Track>(&query)
        .bind(playlist_id)
        .fetch_all(pool)
        .await?;

    Ok(tracks)
}
