use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{not_found, Filter};
use crate::error::AppError;
use crate::models::Track;

/// Columns a listing may sort tracks by
pub const SORTABLE: &[&str] = &["name", "length"];

/// Select list for a `tracks t LEFT JOIN artists_tracks art` grouped by `t.id`
pub(crate) const TRACK_COLUMNS: &str = "t.id, t.name, t.length, \
     COALESCE(array_agg(art.artist_id) FILTER (WHERE art.artist_id IS NOT NULL), '{}'::uuid[]) AS artist_ids";

/// Insert a track together with its artist credits
pub async fn create_track(
    pool: &PgPool,
    name: &str,
    length: i32,
    artist_ids: &[Uuid],
) -> Result<Track, AppError> {
    let track_id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO tracks (id, name, length) VALUES ($1, $2, $3)")
        .bind(track_id)
        .bind(name)
        .bind(length)
        .execute(&mut tx)
        .await?;

    link_artists(&mut tx, track_id, artist_ids).await?;
    tx.commit().await?;

    get_track(pool, track_id).await
}

pub async fn get_track(pool: &PgPool, track_id: Uuid) -> Result<Track, AppError> {
    let query = format!(
        r#"
        SELECT {}
        FROM tracks t
        LEFT JOIN artists_tracks art ON art.track_id = t.id
        WHERE t.id = $1
        GROUP BY t.id
        "#,
        TRACK_COLUMNS
    );

    sqlx::query_as::<_, Track>(&query)
        .bind(track_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| not_found("track"))
}

pub async fn list_tracks(pool: &PgPool, filter: &Filter) -> Result<Vec<Track>, AppError> {
    // order_by() only ever renders allow-listed column names
    let query = format!(
        r#"
        SELECT {}
        FROM tracks t
        LEFT JOIN artists_tracks art ON art.track_id = t.id
        WHERE ($1 = '' OR to_tsvector('simple', t.name) @@ plainto_tsquery('simple', $1))
        GROUP BY t.id
        ORDER BY {}
        LIMIT $2 OFFSET $3
        "#,
        TRACK_COLUMNS,
        filter.order_by()
    );

    let tracks = sqlx::query_as::<_, Track>(&query)
        .bind(&filter.name)
        .bind(filter.limit)
        .bind(filter.offset())
        .fetch_all(pool)
        .await?;

    Ok(tracks)
}

/// Replace name, length and the full set of artist credits
pub async fn update_track(pool: &PgPool, track: &Track) -> Result<Track, AppError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query("UPDATE tracks SET name = $1, length = $2 WHERE id = $3")
        .bind(&track.name)
        .bind(track.length)
        .bind(track.id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(not_found("track"));
    }

    sqlx::query("DELETE FROM artists_tracks WHERE track_id = $1")
        .bind(track.id)
        .execute(&mut tx)
        .await?;
    link_artists(&mut tx, track.id, &track.artist_ids).await?;
    tx.commit().await?;

    get_track(pool, track.id).await
}

pub async fn delete_track(pool: &PgPool, track_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
        .bind(track_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(not_found("track"));
    }
    Ok(())
}

async fn link_artists(
    tx: &mut Transaction<'_, Postgres>,
    track_id: Uuid,
    artist_ids: &[Uuid],
) -> Result<(), AppError> {
    if artist_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO artists_tracks (artist_id, track_id)
        SELECT DISTINCT artist_id, $1 FROM unnest($2::uuid[]) AS artist_id
        "#,
    )
    .bind(track_id)
    .bind(artist_ids)
    .execute(&mut *tx)
    .await?;

    Ok(())
}
