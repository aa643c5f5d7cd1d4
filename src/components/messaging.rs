use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};

use crate::domain::{error::MessagingError, notification::Notification};

/// Upper bound the provider accepts for a single multicast.
pub const MAX_MULTICAST_TOKENS: usize = 500;

pub const SEND_URI: &str = "/v1/projects/{project_id}/messages:send";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AndroidNotification {
    pub default_vibrate_timings: bool,
    pub icon: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AndroidConfig {
    pub notification: AndroidNotification,
}

/// One notification addressed to every device of a user.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub notification: Notification,
    pub android: Option<AndroidConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResponse {
    pub token: String,
    pub message_id: Option<String>,
    pub error: Option<String>,
}

impl SendResponse {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResponse {
    pub success_count: usize,
    pub failure_count: usize,
    pub responses: Vec<SendResponse>,
}

impl BatchResponse {
    pub fn from_responses(responses: Vec<SendResponse>) -> Self {
        let success_count = responses.iter().filter(|r| r.is_success()).count();
        Self {
            success_count,
            failure_count: responses.len() - success_count,
            responses,
        }
    }
}

#[async_trait]
pub trait PushMessenger: Send + Sync {
    /// Sends one message per token. Per-token failures are reported in the batch, not as `Err`.
    async fn send_multicast(&self, message: &MulticastMessage)
        -> Result<BatchResponse, MessagingError>;
}

#[derive(Serialize)]
struct SendRequest<'a> {
    message: TokenMessage<'a>,
}

#[derive(Serialize)]
struct TokenMessage<'a> {
    token: &'a str,
    notification: &'a Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    android: Option<&'a AndroidConfig>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct SendMessageResponse {
    pub name: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ProviderErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ProviderErrorResponse {
    pub error: ProviderErrorBody,
}

/// Firebase Cloud Messaging over the HTTP v1 API.
#[derive(Debug, Clone)]
pub struct FcmComponent {
    url: String,
    project_id: String,
    access_token: String,
    client: reqwest::Client,
}

impl FcmComponent {
    pub fn new(url: String, project_id: String, access_token: String) -> Self {
        if project_id.is_empty() {
            log::error!("missing messaging project id, every push will be rejected");
        }

        Self {
            url: url.trim_end_matches('/').to_string(),
            project_id,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    fn send_url(&self) -> String {
        format!(
            "{}{}",
            self.url,
            SEND_URI.replace("{project_id}", &self.project_id)
        )
    }

    async fn send_one(&self, token: &str, message: &MulticastMessage) -> SendResponse {
        let body = SendRequest {
            message: TokenMessage {
                token,
                notification: &message.notification,
                android: message.android.as_ref(),
            },
        };

        let result = self
            .client
            .post(self.send_url())
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await;

        let (message_id, error) = match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<SendMessageResponse>().await {
                    Ok(sent) => (Some(sent.name), None),
                    Err(err) => (None, Some(err.to_string())),
                }
            }
            Ok(response) => {
                let status = response.status();
                match response.json::<ProviderErrorResponse>().await {
                    Ok(rejection) => (None, Some(rejection.error.message)),
                    Err(_) => (None, Some(format!("push provider answered {status}"))),
                }
            }
            Err(err) => (None, Some(err.to_string())),
        };

        SendResponse {
            token: token.to_string(),
            message_id,
            error,
        }
    }
}

#[async_trait]
impl PushMessenger for FcmComponent {
    #[tracing::instrument(name = "Send multicast push", skip(self, message), fields(tokens = message.tokens.len()))]
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> Result<BatchResponse, MessagingError> {
        if message.tokens.is_empty() {
            return Err(MessagingError::InvalidArgument(
                "tokens must be a non-empty list".to_string(),
            ));
        }
        if message.tokens.len() > MAX_MULTICAST_TOKENS {
            return Err(MessagingError::InvalidArgument(format!(
                "tokens must not contain more than {MAX_MULTICAST_TOKENS} tokens"
            )));
        }

        let responses = join_all(
            message
                .tokens
                .iter()
                .map(|token| self.send_one(token, message)),
        )
        .await;

        Ok(BatchResponse::from_responses(responses))
    }
}
