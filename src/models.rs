//! API response models.
//!
//! These are the wire shapes encoded by the serving layer. Field names follow
//! the provider's camelCase convention so the frontend can consume responses
//! without a translation step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===== Conversation Listing =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversations {
    pub chats: Vec<Chat>,
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub last_message: ShortMessage,
    pub is_one_on_one: bool,
    pub creator: String,
    pub is_read: bool,
    pub is_last_message_from_me: bool,
    pub members: Vec<ChatMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub creator: String,
    pub id: String,
    pub display_name: String,
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub display_name: String,
    pub last_message: ShortMessage,
    pub description: String,
    pub creator: String,
    pub parent_team_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMember {
    pub mri: String,
    pub role: String,
    pub tenant_id: String,
    pub object_id: String,
}

// ===== Conversation Messages =====

/// Identifying core of a message, also used for last-message previews.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortMessage {
    pub id: String,
    pub content: String,
    pub clean_content: String,
    pub from: String,
}

/// A fully processed message.
///
/// Root messages carry their direct replies ordered by ascending sequence id;
/// reply messages have an empty `replies` vector. `reactions` maps lowercased
/// reaction labels to distinct-user counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(flatten)]
    pub short: ShortMessage,
    pub im_display_name: String,
    pub original_arrival_time: Option<DateTime<Utc>>,
    pub conversation_id: String,
    /// Id of the thread root this message belongs to; equals the message's
    /// own id when the message is itself a root.
    #[serde(rename = "parentID")]
    pub parent_id: String,
    pub sequence_id: i64,
    pub message_type: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reactions: BTreeMap<String, usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationResponse {
    pub messages: Vec<Message>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_replies_and_reactions_are_omitted() {
        let message = Message {
            short: ShortMessage {
                id: "1".to_string(),
                content: "<p>hi</p>".to_string(),
                clean_content: "hi".to_string(),
                from: "8:alice".to_string(),
            },
            parent_id: "1".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&message).expect("serializable");
        assert!(json.get("replies").is_none());
        assert!(json.get("reactions").is_none());
        assert_eq!(json["parentID"], "1");
        assert_eq!(json["cleanContent"], "hi");
    }

    #[test]
    fn populated_reactions_serialize_as_map() {
        let message = Message {
            reactions: BTreeMap::from([("like".to_string(), 2)]),
            ..Default::default()
        };

        let json = serde_json::to_value(&message).expect("serializable");
        assert_eq!(json["reactions"]["like"], 2);
    }
}
