//! Messaging provider abstraction.
//!
//! The rest of the server never talks to the provider's transport directly.
//! Everything it needs is behind the narrow [`ChatProvider`] capability trait:
//! fetch the conversation listing, fetch the raw messages of one conversation,
//! fetch a profile image. The concrete HTTP transport lives in `http`; tests
//! substitute their own implementations.

pub mod http;
pub mod types;

pub use http::{HttpChatProvider, ProviderConfig};
pub use types::{RawConversations, RawMessage};

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by provider fetches.
///
/// Any of these is fatal for the current request only: the result is never
/// cached and a later request may retry.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned status {status}: {body}")]
    Service {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to decode provider response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("provider authorization missing or expired")]
    Unauthorized,
}

/// Capability interface over the messaging provider.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Fetch the full conversation listing (chats and teams).
    async fn fetch_conversations(&self) -> Result<types::RawConversations, ProviderError>;

    /// Fetch all raw messages of a single conversation.
    async fn fetch_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<types::RawMessage>, ProviderError>;

    /// Fetch the profile image bytes for a user or conversation id.
    async fn fetch_profile_picture(&self, id: &str) -> Result<Vec<u8>, ProviderError>;
}
