/// User Routes
///
/// Registration, login and refresh are public. Everything else under
/// `/users/{id}` runs behind `AuthMiddleware`, which has already checked
/// that the bearer token belongs to `{id}`.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{hash_password, validate_password_length, AuthManager};
use crate::error::{AppError, ErrorContext};
use crate::middleware::Identity;
use crate::repository::{artist, user};
use crate::validators::{is_valid_email, is_valid_username};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(rename = "refresh token", alias = "refresh_token")]
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct FollowRequest {
    pub id: Uuid,
}

/// POST /users/register
///
/// # Errors
/// - 400: invalid email/username, password length outside [8, 64]
/// - 409: email or username already taken
pub async fn register(
    form: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let username = is_valid_username(&form.username)?;
    let email = is_valid_email(&form.email)?;
    validate_password_length(&form.password)?;
    let password_hash = hash_password(&form.password)?;

    let user = user::create_user(pool.get_ref(), &username, &email, &password_hash)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(user))
}

/// POST /users/login
///
/// Returns `{"access token": .., "refresh token": ..}`.
///
/// # Errors
/// - 400: password length outside [8, 64]
/// - 401: unknown email or wrong password (same body for both)
pub async fn login(
    form: web::Json<LoginRequest>,
    manager: web::Data<AuthManager>,
) -> Result<HttpResponse, AppError> {
    validate_password_length(&form.password)?;

    let pair = manager.login(form.email.trim(), &form.password).await?;

    Ok(HttpResponse::Ok().json(pair))
}

/// POST /users/{id}/refresh
///
/// Trades the stored refresh token for a new pair. The presented token is
/// superseded by the new one.
pub async fn refresh(
    path: web::Path<Uuid>,
    form: web::Json<RefreshRequest>,
    manager: web::Data<AuthManager>,
) -> Result<HttpResponse, AppError> {
    let pair = manager.refresh(path.into_inner(), &form.refresh_token).await?;

    Ok(HttpResponse::Ok().json(pair))
}

/// GET /users/{id}
pub async fn get_user(
    identity: web::ReqData<Identity>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let user = user::get_user(pool.get_ref(), identity.0).await?;

    Ok(HttpResponse::Ok().json(user))
}

/// PUT /users/{id}
pub async fn update_user(
    identity: web::ReqData<Identity>,
    form: web::Json<UpdateUserRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let username = is_valid_username(&form.username)?;
    let user = user::update_username(pool.get_ref(), identity.0, &username).await?;

    tracing::info!(user_id = %user.id, "Username updated");
    Ok(HttpResponse::Ok().json(user))
}

/// DELETE /users/{id}
pub async fn delete_user(
    identity: web::ReqData<Identity>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    user::delete_user(pool.get_ref(), identity.0).await?;

    tracing::info!(user_id = %identity.0, "User deleted");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "delete successfully" })))
}

/// PUT /users/{id}/password
///
/// # Errors
/// - 400: new password length outside [8, 64], or old password wrong
pub async fn change_password(
    identity: web::ReqData<Identity>,
    form: web::Json<ChangePasswordRequest>,
    manager: web::Data<AuthManager>,
) -> Result<HttpResponse, AppError> {
    validate_password_length(&form.new_password)?;

    manager
        .change_password(identity.0, &form.old_password, &form.new_password)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "password changed successfully" })))
}

/// GET /users/{id}/artists
pub async fn followed_artists(
    identity: web::ReqData<Identity>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let artists = user::followed_artists(pool.get_ref(), identity.0).await?;

    Ok(HttpResponse::Ok().json(artists))
}

/// POST /users/{id}/artists
pub async fn follow_artist(
    identity: web::ReqData<Identity>,
    form: web::Json<FollowRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    // 404 for an unknown artist rather than a bare FK failure
    artist::get_artist(pool.get_ref(), form.id).await?;
    user::follow_artist(pool.get_ref(), identity.0, form.id).await?;

    tracing::info!(user_id = %identity.0, artist_id = %form.id, "Artist followed");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "follow artist successfully" })))
}
