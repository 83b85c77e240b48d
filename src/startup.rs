use actix_web::dev::Server;
use actix_web::{error, middleware::Logger, web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::AuthManager;
use crate::configuration::JwtSettings;
use crate::error::{AppError, ValidationError};
use crate::logger::LoggerMiddleware;
use crate::middleware::AuthMiddleware;
use crate::repository::PgCredentialStore;
use crate::routes::{
    add_tracks, artist_tracks, change_password, create_artist, create_playlist, create_track,
    delete_artist, delete_playlist, delete_track, delete_user, follow_artist, followed_artists,
    get_artist, get_playlist, get_track, get_user, health_check, list_artists, list_playlists,
    list_tracks, login, playlist_tracks, refresh, register, remove_tracks, update_artist,
    update_track, update_user,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let credentials = Arc::new(PgCredentialStore::new(connection.clone()));
    let auth_manager = web::Data::new(AuthManager::new(&jwt_config, credentials));
    let connection = web::Data::new(connection);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())      // Standard logging
            .wrap(LoggerMiddleware)       // Custom logging

            // Shared state
            .app_data(connection.clone())
            .app_data(auth_manager.clone())

            // Malformed bodies, paths and queries become 400 with the usual error body
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                bad_request(format!("request body ({})", err))
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                bad_request(format!("path ({})", err))
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                bad_request(format!("query ({})", err))
            }))

            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/users/register", web::post().to(register))
            .route("/users/login", web::post().to(login))
            .route("/users/{id}/refresh", web::post().to(refresh))

            .service(
                web::resource("/tracks")
                    .route(web::get().to(list_tracks))
                    .route(web::post().to(create_track))
                    .route(web::put().to(update_track)),
            )
            .service(
                web::resource("/tracks/{id}")
                    .route(web::get().to(get_track))
                    .route(web::delete().to(delete_track)),
            )
            .service(
                web::resource("/artists")
                    .route(web::get().to(list_artists))
                    .route(web::post().to(create_artist))
                    .route(web::put().to(update_artist)),
            )
            .service(
                web::resource("/artists/{id}")
                    .route(web::get().to(get_artist))
                    .route(web::delete().to(delete_artist)),
            )
            .route("/artists/{id}/tracks", web::get().to(artist_tracks))

            // Protected routes: bearer token must belong to {id}
            .service(
                web::scope("/users/{id}")
                    .wrap(AuthMiddleware::new(auth_manager.clone()))
                    .service(
                        web::resource("")
                            .route(web::get().to(get_user))
                            .route(web::put().to(update_user))
                            .route(web::delete().to(delete_user)),
                    )
                    .route("/password", web::put().to(change_password))
                    .service(
                        web::resource("/artists")
                            .route(web::get().to(followed_artists))
                            .route(web::post().to(follow_artist)),
                    )
                    .service(
                        web::resource("/playlists")
                            .route(web::get().to(list_playlists))
                            .route(web::post().to(create_playlist)),
                    )
                    .service(
                        web::resource("/playlists/{playlist_id}")
                            .route(web::get().to(get_playlist))
                            .route(web::delete().to(delete_playlist)),
                    )
                    .service(
                        web::resource("/playlists/{playlist_id}/tracks")
                            .route(web::get().to(playlist_tracks))
                            .route(web::post().to(add_tracks))
                            .route(web::delete().to(remove_tracks)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}

fn bad_request(detail: String) -> error::Error {
    AppError::Validation(ValidationError::InvalidFormat(detail)).into()
}
