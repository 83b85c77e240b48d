use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Track;
use crate::repository::{track, Filter, ListQuery};
use crate::validators::{is_valid_length, is_valid_name};

#[derive(Deserialize)]
pub struct CreateTrackRequest {
    pub name: String,
    pub length: i32,
    #[serde(default, alias = "artist_id")]
    pub artist_ids: Vec<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateTrackRequest {
    pub id: Uuid,
    pub name: String,
    pub length: i32,
    #[serde(default, alias = "artist_id")]
    pub artist_ids: Vec<Uuid>,
}

/// POST /tracks
///
/// An unknown artist id fails the whole insert with 404.
pub async fn create_track(
    form: web::Json<CreateTrackRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name("name", &form.name)?;
    let length = is_valid_length(form.length)?;

    let track = track::create_track(pool.get_ref(), &name, length, &form.artist_ids).await?;

    tracing::info!(track_id = %track.id, "Track created");
    Ok(HttpResponse::Created().json(track))
}

/// GET /tracks/{id}
pub async fn get_track(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let track = track::get_track(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(track))
}

/// GET /tracks?name=&sort=&page=&limit=
pub async fn list_tracks(
    query: web::Query<ListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let filter = Filter::from_query(&query, track::SORTABLE)?;
    let tracks = track::list_tracks(pool.get_ref(), &filter).await?;

    Ok(HttpResponse::Ok().json(tracks))
}

/// PUT /tracks
///
/// Replaces the artist credits wholesale.
pub async fn update_track(
    form: web::Json<UpdateTrackRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let changes = Track {
        id: form.id,
        name: is_valid_name("name", &form.name)?,
        length: is_valid_length(form.length)?,
        artist_ids: form.artist_ids,
    };

    let updated = track::update_track(pool.get_ref(), &changes).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /tracks/{id}
pub async fn delete_track(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let track_id = path.into_inner();
    track::delete_track(pool.get_ref(), track_id).await?;

    tracing::info!(track_id = %track_id, "Track deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "delete successfully" })))
}
