//! Artists, tracks, follows and playlists against a fresh database

use music_catalog::configuration::{get_configuration, DatabaseSettings};
use music_catalog::startup::run;
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    let server = run(listener, connection_pool, configuration.jwt).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
    }
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");
    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    async fn create_artist(&self, name: &str) -> Value {
        let response = self
            .client
            .post(self.url("/artists"))
            .json(&json!({ "name": name, "description": format!("About {}", name) }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());
        response.json().await.unwrap()
    }

    async fn create_track(&self, name: &str, length: i32, artist_ids: &[&Value]) -> Value {
        let ids: Vec<&Value> = artist_ids.iter().map(|artist| &artist["id"]).collect();
        let response = self
            .client
            .post(self.url("/tracks"))
            .json(&json!({ "name": name, "length": length, "artist_ids": ids }))
            .send()
            .await
            .expect("Failed to execute request.");
        assert_eq!(201, response.status().as_u16());
        response.json().await.unwrap()
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Register + login; returns (user id, access token)
    async fn sign_up(&self, username: &str) -> (String, String) {
        let email = format!("{}@example.com", username);
        let registered: Value = self
            .client
            .post(self.url("/users/register"))
            .json(&json!({ "username": username, "email": email, "password": "password1" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let tokens: Value = self
            .client
            .post(self.url("/users/login"))
            .json(&json!({ "email": email, "password": "password1" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        (
            registered["id"].as_str().unwrap().to_string(),
            tokens["access token"].as_str().unwrap().to_string(),
        )
    }
}

fn names(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect()
}

// --- Artists ---

#[tokio::test]
async fn artist_crud() {
    let app = spawn_app().await;
    let artist = app.create_artist("Nina Simone").await;
    let id = artist["id"].as_str().unwrap();

    let fetched: Value = app.get(&format!("/artists/{}", id)).await.json().await.unwrap();
    assert_eq!(fetched, artist);

    let response = app
        .client
        .put(app.url("/artists"))
        .json(&json!({ "id": id, "name": "Nina Simone", "description": "Pianist" }))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["description"], "Pianist");

    let response = app.client.delete(app.url(&format!("/artists/{}", id))).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());

    assert_eq!(404, app.get(&format!("/artists/{}", id)).await.status().as_u16());
    let response = app.client.delete(app.url(&format!("/artists/{}", id))).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn get_artist_with_malformed_id_returns_400() {
    let app = spawn_app().await;

    assert_eq!(400, app.get("/artists/not-a-uuid").await.status().as_u16());
}

#[tokio::test]
async fn list_artists_filters_sorts_and_pages() {
    let app = spawn_app().await;
    for name in ["Blue Note Quartet", "Red Hot Band", "Blue Lagoon", "Green Day Trip"] {
        app.create_artist(name).await;
    }

    let body: Value = app
        .get(&format!("/artists?name={}&sort=-name", urlencoding::encode("blue")))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(names(&body), vec!["Blue Note Quartet", "Blue Lagoon"]);

    let body: Value = app.get("/artists?sort=name&limit=2&page=2").await.json().await.unwrap();
    assert_eq!(names(&body), vec!["Green Day Trip", "Red Hot Band"]);

    assert_eq!(400, app.get("/artists?page=abc").await.status().as_u16());
    assert_eq!(400, app.get("/artists?sort=description").await.status().as_u16());
}

// --- Tracks ---

#[tokio::test]
async fn track_carries_its_artists() {
    let app = spawn_app().await;
    let first = app.create_artist("Simon").await;
    let second = app.create_artist("Garfunkel").await;

    let track = app.create_track("The Boxer", 308, &[&first, &second]).await;
    let artist_ids = track["artist_ids"].as_array().unwrap();
    assert_eq!(artist_ids.len(), 2);
    assert!(artist_ids.contains(&first["id"]));
    assert!(artist_ids.contains(&second["id"]));

    let tracks: Value = app
        .get(&format!("/artists/{}/tracks", first["id"].as_str().unwrap()))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(names(&tracks), vec!["The Boxer"]);
}

#[tokio::test]
async fn update_track_replaces_credits() {
    let app = spawn_app().await;
    let first = app.create_artist("Original").await;
    let second = app.create_artist("Cover").await;
    let track = app.create_track("Hallelujah", 270, &[&first]).await;

    let response = app
        .client
        .put(app.url("/tracks"))
        .json(&json!({
            "id": track["id"],
            "name": "Hallelujah",
            "length": 412,
            "artist_ids": [second["id"]],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["length"], 412);
    assert_eq!(updated["artist_ids"], json!([second["id"]]));
}

#[tokio::test]
async fn create_track_with_unknown_artist_returns_404() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/tracks"))
        .json(&json!({ "name": "Orphan", "length": 10, "artist_ids": [Uuid::new_v4()] }))
        .send()
        .await
        .unwrap();

    assert_eq!(404, response.status().as_u16());
    let listed: Value = app.get("/tracks").await.json().await.unwrap();
    assert!(listed.as_array().unwrap().is_empty(), "insert must roll back");
}

#[tokio::test]
async fn list_tracks_sorts_by_length() {
    let app = spawn_app().await;
    app.create_track("Short", 60, &[]).await;
    app.create_track("Long", 600, &[]).await;
    app.create_track("Medium", 240, &[]).await;

    let body: Value = app.get("/tracks?sort=-length").await.json().await.unwrap();
    assert_eq!(names(&body), vec!["Long", "Medium", "Short"]);

    let body: Value = app.get("/tracks?sort=length&limit=1").await.json().await.unwrap();
    assert_eq!(names(&body), vec!["Short"]);

    let response = app.client.delete(app.url("/tracks/not-a-uuid")).send().await.unwrap();
    assert_eq!(400, response.status().as_u16());
}

// --- Follows and playlists ---

#[tokio::test]
async fn follow_artist_and_list_followed() {
    let app = spawn_app().await;
    let artist = app.create_artist("Fela Kuti").await;
    let (user_id, token) = app.sign_up("listener").await;
    let url = app.url(&format!("/users/{}/artists", user_id));

    for _ in 0..2 {
        let response = app
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "id": artist["id"] }))
            .send()
            .await
            .unwrap();
        assert_eq!(200, response.status().as_u16());
    }

    let followed: Value = app.client.get(&url).bearer_auth(&token).send().await.unwrap().json().await.unwrap();
    assert_eq!(names(&followed), vec!["Fela Kuti"]);

    let response = app
        .client
        .post(&url)
        .bearer_auth(&token)
        .json(&json!({ "id": Uuid::new_v4() }))
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn playlist_lifecycle() {
    let app = spawn_app().await;
    let first = app.create_track("One", 100, &[]).await;
    let second = app.create_track("Two", 200, &[]).await;
    let (user_id, token) = app.sign_up("curator").await;
    let base = app.url(&format!("/users/{}/playlists", user_id));

    let response = app
        .client
        .post(&base)
        .bearer_auth(&token)
        .json(&json!({ "name": "Road trip" }))
        .send()
        .await
        .unwrap();
    assert_eq!(201, response.status().as_u16());
    let playlist: Value = response.json().await.unwrap();
    assert_eq!(playlist["track_ids"], json!([]));
    let playlist_url = format!("{}/{}", base, playlist["id"].as_str().unwrap());

    let response = app
        .client
        .post(&base)
        .bearer_auth(&token)
        .json(&json!({ "name": "Road trip" }))
        .send()
        .await
        .unwrap();
    assert_eq!(409, response.status().as_u16());

    let response = app
        .client
        .post(format!("{}/tracks", playlist_url))
        .bearer_auth(&token)
        .json(&json!({ "track_ids": [first["id"], second["id"]] }))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());
    let playlist: Value = response.json().await.unwrap();
    assert_eq!(playlist["track_ids"].as_array().unwrap().len(), 2);

    let response = app
        .client
        .delete(format!("{}/tracks", playlist_url))
        .bearer_auth(&token)
        .json(&json!({ "track_ids": [first["id"]] }))
        .send()
        .await
        .unwrap();
    let playlist: Value = response.json().await.unwrap();
    assert_eq!(playlist["track_ids"], json!([second["id"]]));

    let tracks: Value = app
        .client
        .get(format!("{}/tracks", playlist_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(names(&tracks), vec!["Two"]);

    let listed: Value = app.client.get(&base).bearer_auth(&token).send().await.unwrap().json().await.unwrap();
    assert_eq!(names(&listed), vec!["Road trip"]);

    let response = app.client.delete(&playlist_url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(200, response.status().as_u16());
    let response = app.client.get(&playlist_url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn playlists_of_other_users_are_invisible() {
    let app = spawn_app().await;
    let (alice_id, alice_token) = app.sign_up("alice").await;
    let (bob_id, bob_token) = app.sign_up("bob").await;

    let playlist: Value = app
        .client
        .post(app.url(&format!("/users/{}/playlists", alice_id)))
        .bearer_auth(&alice_token)
        .json(&json!({ "name": "Private" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let playlist_id = playlist["id"].as_str().unwrap();

    // Bob through his own path: not his playlist
    let response = app
        .client
        .get(app.url(&format!("/users/{}/playlists/{}", bob_id, playlist_id)))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(404, response.status().as_u16());

    // Bob through Alice's path: wrong token
    let response = app
        .client
        .delete(app.url(&format!("/users/{}/playlists/{}", alice_id, playlist_id)))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(401, response.status().as_u16());
}
