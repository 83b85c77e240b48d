/// Playlist routes, all under `/users/{id}/playlists` and therefore behind
/// the auth middleware.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::Identity;
use crate::repository::playlist;
use crate::validators::is_valid_name;

#[derive(Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct PlaylistTracksRequest {
    pub track_ids: Vec<Uuid>,
}

/// POST /users/{id}/playlists
///
/// 409 when the user already has a playlist with this name.
pub async fn create_playlist(
    identity: web::ReqData<Identity>,
    form: web::Json<CreatePlaylistRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name("name", &form.name)?;
    let playlist = playlist::create_playlist(pool.get_ref(), identity.0, &name).await?;

    tracing::info!(user_id = %identity.0, playlist_id = %playlist.id, "Playlist created");
    Ok(HttpResponse::Created().json(playlist))
}

/// GET /users/{id}/playlists
pub async fn list_playlists(
    identity: web::ReqData<Identity>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let playlists = playlist::list_playlists(pool.get_ref(), identity.0).await?;

    Ok(HttpResponse::Ok().json(playlists))
}

/// GET /users/{id}/playlists/{playlist_id}
pub async fn get_playlist(
    identity: web::ReqData<Identity>,
    path: web::Path<(Uuid, Uuid)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let (_, playlist_id) = path.into_inner();
    let playlist = playlist::get_playlist(pool.get_ref(), identity.0, playlist_id).await?;

    Ok(HttpResponse::Ok().json(playlist))
}

/// DELETE /users/{id}/playlists/{playlist_id}
pub async fn delete_playlist(
    identity: web::ReqData<Identity>,
    path: web::Path<(Uuid, Uuid)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let (_, playlist_id) = path.into_inner();
    playlist::delete_playlist(pool.get_ref(), identity.0, playlist_id).await?;

    tracing::info!(user_id = %identity.0, playlist_id = %playlist_id, "Playlist deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "delete successfully" })))
}

/// GET /users/{id}/playlists/{playlist_id}/tracks
pub async fn playlist_tracks(
    identity: web::ReqData<Identity>,
    path: web::Path<(Uuid, Uuid)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let (_, playlist_id) = path.into_inner();
    let tracks = playlist::playlist_tracks(pool.get_ref(), identity.0, playlist_id).await?;

    Ok(HttpResponse::Ok().json(tracks))
}

/// POST /users/{id}/playlists/{playlist_id}/tracks
pub async fn add_tracks(
    identity: web::ReqData<Identity>,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Json<PlaylistTracksRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let (_, playlist_id) = path.into_inner();
    let playlist =
        playlist::add_tracks(pool.get_ref(), identity.0, playlist_id, &form.track_ids).await?;

    Ok(HttpResponse::Ok().json(playlist))
}

/// DELETE /users/{id}/playlists/{playlist_id}/tracks
pub async fn remove_tracks(
    identity: web::ReqData<Identity>,
    path: web::Path<(Uuid, Uuid)>,
    form: web::Json<PlaylistTracksRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let (_, playlist_id) = path.into_inner();
    let playlist =
        playlist::remove_tracks(pool.get_ref(), identity.0, playlist_id, &form.track_ids).await?;

    Ok(HttpResponse::Ok().json(playlist))
}
