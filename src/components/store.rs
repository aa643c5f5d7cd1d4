use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{
    error::StoreError,
    room::{Room, UserProfile},
};

/// Point reads against the realtime database. The dispatcher never writes.
#[async_trait]
pub trait RoomStore: Send + Sync {
    /// `Ok(None)` when nothing is stored under `rooms/{room_id}`.
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, StoreError>;

    /// `Ok(None)` when nothing is stored under `users/{user_id}`.
    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    async fn ping(&self) -> bool;
}

/// Reads the realtime database through its REST interface (`{url}/{path}.json`).
#[derive(Debug, Clone)]
pub struct RealtimeDatabaseComponent {
    url: String,
    auth_token: String,
    client: reqwest::Client,
}

impl RealtimeDatabaseComponent {
    pub fn new(url: String, auth_token: String) -> Self {
        if url.is_empty() {
            log::error!("missing realtime database URL, every read will fail");
        }

        Self {
            url: url.trim_end_matches('/').to_string(),
            auth_token,
            client: reqwest::Client::new(),
        }
    }

    fn url_for(&self, segments: &[&str]) -> String {
        let path = segments
            .iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<String>>()
            .join("/");
        format!("{}/{}.json", self.url, path)
    }

    fn authenticated(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.auth_token.is_empty() {
            request
        } else {
            request.query(&[("auth", self.auth_token.as_str())])
        }
    }

    #[tracing::instrument(name = "Read realtime database value", skip(self))]
    async fn read<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<Option<T>, StoreError> {
        let path = segments.join("/");
        let response = self
            .authenticated(self.client.get(self.url_for(segments)))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                path,
            });
        }

        let value = response.json::<Value>().await?;
        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|err| StoreError::Decode {
                path,
                reason: err.to_string(),
            })
    }
}

#[async_trait]
impl RoomStore for RealtimeDatabaseComponent {
    async fn get_room(&self, room_id: &str) -> Result<Option<Room>, StoreError> {
        self.read(&["rooms", room_id]).await
    }

    async fn get_user_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.read(&["users", user_id]).await
    }

    async fn ping(&self) -> bool {
        let request = self
            .authenticated(self.client.get(format!("{}/.json", self.url)))
            .query(&[("shallow", "true")]);

        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                log::error!("Error on pinging the realtime database: {:?}", err);
                false
            }
        }
    }
}
