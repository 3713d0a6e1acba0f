//! Raw records as returned by the messaging provider.
//!
//! These mirror the provider's wire format and are deserialized leniently:
//! every field has a serde default so a record missing optional data still
//! yields a usable value instead of failing the whole batch.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A single raw message from the provider feed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub im_display_name: String,
    #[serde(default)]
    pub original_arrival_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub conversation_id: String,
    /// Link string encoding the parent-reply relationship as a
    /// `;messageid=<id>` parameter.
    #[serde(default)]
    pub conversation_link: String,
    /// Provider-assigned monotonically increasing ordering key.
    #[serde(default)]
    pub sequence_id: i64,
    #[serde(default)]
    pub message_type: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub properties: RawMessageProperties,
}

/// Optional per-message properties.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessageProperties {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub emotions: Vec<RawEmotion>,
}

/// One reaction label together with the users who reacted with it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmotion {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub users: Vec<String>,
}

/// The provider's conversation listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConversations {
    #[serde(default)]
    pub chats: Vec<RawChat>,
    #[serde(default)]
    pub teams: Vec<RawTeam>,
}

/// A direct or group chat.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChat {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub last_message: RawMessage,
    #[serde(default)]
    pub is_one_on_one: bool,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub is_last_message_from_me: bool,
    #[serde(default)]
    pub members: Vec<RawChatMember>,
}

/// A team grouping one or more channels.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTeam {
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub channels: Vec<RawChannel>,
}

/// A channel inside a team.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChannel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub parent_team_id: String,
    #[serde(default)]
    pub last_message: RawMessage,
}

/// Membership record of a chat.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChatMember {
    #[serde(default)]
    pub mri: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub object_id: String,
}
