//! HTTP client for end-to-end tests
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::fmt::Display;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    /// GET /info?group=..&song=..
    pub async fn get_info(&self, group: &str, song: &str) -> Response {
        self.get_info_with_query(&[("group", group), ("song", song)])
            .await
    }

    /// GET /info with arbitrary query parameters
    pub async fn get_info_with_query(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/info"))
            .query(query)
            .send()
            .await
            .expect("Info request failed")
    }

    /// GET /songs
    pub async fn list_songs(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/songs"))
            .query(query)
            .send()
            .await
            .expect("List songs request failed")
    }

    /// GET /songs, decoded
    pub async fn list_songs_json(&self, query: &[(&str, &str)]) -> Vec<Value> {
        let response = self.list_songs(query).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Songs list is not JSON")
    }

    /// POST /songs
    pub async fn create_song(&self, group: &str, song: &str) -> Response {
        self.create_song_with_body(json!({ "group": group, "song": song }))
            .await
    }

    /// POST /songs with an arbitrary JSON body
    pub async fn create_song_with_body(&self, body: Value) -> Response {
        self.client
            .post(self.url("/songs"))
            .json(&body)
            .send()
            .await
            .expect("Create song request failed")
    }

    /// GET /song/{id}/verses
    pub async fn get_verses(&self, id: impl Display, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url(&format!("/song/{}/verses", id)))
            .query(query)
            .send()
            .await
            .expect("Verses request failed")
    }

    /// PUT /song/{id}
    pub async fn update_song(&self, id: impl Display, body: Value) -> Response {
        self.client
            .put(self.url(&format!("/song/{}", id)))
            .json(&body)
            .send()
            .await
            .expect("Update song request failed")
    }

    /// PATCH /song/{id}
    pub async fn patch_song(&self, id: impl Display, body: Value) -> Response {
        self.client
            .patch(self.url(&format!("/song/{}", id)))
            .json(&body)
            .send()
            .await
            .expect("Patch song request failed")
    }

    /// DELETE /song/{id}
    pub async fn delete_song(&self, id: impl Display) -> Response {
        self.client
            .delete(self.url(&format!("/song/{}", id)))
            .send()
            .await
            .expect("Delete song request failed")
    }
}
