use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Artist;
use crate::repository::{artist, Filter, ListQuery};
use crate::validators::{is_valid_description, is_valid_name};

#[derive(Deserialize)]
pub struct CreateArtistRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize)]
pub struct UpdateArtistRequest {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// POST /artists
pub async fn create_artist(
    form: web::Json<CreateArtistRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name("name", &form.name)?;
    let description = is_valid_description(&form.description)?;

    let artist = artist::create_artist(pool.get_ref(), &name, &description).await?;

    tracing::info!(artist_id = %artist.id, "Artist created");
    Ok(HttpResponse::Created().json(artist))
}

/// GET /artists/{id}
pub async fn get_artist(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let artist = artist::get_artist(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(artist))
}

/// GET /artists?name=&sort=&page=&limit=
pub async fn list_artists(
    query: web::Query<ListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let filter = Filter::from_query(&query, artist::SORTABLE)?;
    let artists = artist::list_artists(pool.get_ref(), &filter).await?;

    Ok(HttpResponse::Ok().json(artists))
}

/// PUT /artists
pub async fn update_artist(
    form: web::Json<UpdateArtistRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let changes = Artist {
        id: form.id,
        name: is_valid_name("name", &form.name)?,
        description: is_valid_description(&form.description)?,
    };

    let updated = artist::update_artist(pool.get_ref(), &changes).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /artists/{id}
pub async fn delete_artist(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let artist_id = path.into_inner();
    artist::delete_artist(pool.get_ref(), artist_id).await?;

    tracing::info!(artist_id = %artist_id, "Artist deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "delete successfully" })))
}

/// GET /artists/{id}/tracks
pub async fn artist_tracks(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let tracks = artist::tracks_of_artist(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(tracks))
}
