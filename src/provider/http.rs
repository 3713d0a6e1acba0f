//! HTTP transport for the messaging provider API.

use super::types::{RawConversations, RawMessage};
use super::{ChatProvider, ProviderError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::env;
use std::time::Duration;

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

/// Configuration for the provider HTTP client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout: Duration,
}

impl ProviderConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("CHAT_PROVIDER_URL", "https://chat.provider.invalid/api"),
            auth_token: env::var("CHAT_PROVIDER_TOKEN").ok(),
            request_timeout: env_duration_millis("CHAT_PROVIDER_TIMEOUT_MS", 30_000),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// [`ChatProvider`] implementation backed by the provider's REST API.
#[derive(Clone)]
pub struct HttpChatProvider {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl HttpChatProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("chatbridge/0.1")
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self {
            http: client,
            config,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn get_raw(&self, path: &str) -> Result<Vec<u8>, ProviderError> {
        let mut request = self.http.get(self.endpoint(path));
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(ProviderError::Http)?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Service { status, body });
        }

        let body = response.bytes().await.map_err(ProviderError::Http)?;
        Ok(body.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let body = self.get_raw(path).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Envelope the provider wraps message listings in.
#[derive(Deserialize)]
struct MessagesEnvelope {
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[async_trait]
impl ChatProvider for HttpChatProvider {
    async fn fetch_conversations(&self) -> Result<RawConversations, ProviderError> {
        self.get_json("/v1/conversations").await
    }

    async fn fetch_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<RawMessage>, ProviderError> {
        let envelope: MessagesEnvelope = self
            .get_json(&format!("/v1/conversations/{conversation_id}/messages"))
            .await?;
        Ok(envelope.messages)
    }

    async fn fetch_profile_picture(&self, id: &str) -> Result<Vec<u8>, ProviderError> {
        self.get_raw(&format!("/v1/profilePicture/{id}")).await
    }
}
