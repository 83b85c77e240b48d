/// Catalog records as they leave the database and go out as JSON.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Artist {
    pub id: Uuid,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Track {
    pub id: Uuid,
    pub name: String,
    /// Duration in seconds
    pub length: i32,
    pub artist_ids: Vec<Uuid>,
}

/// Public view of a user. The password digest never leaves the
/// credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub track_ids: Vec<Uuid>,
}
