//! Conversation endpoints: listing, threaded messages, profile pictures.
//!
//! The listing and message endpoints run through the response cache; a miss
//! fetches from the provider, reconstructs/maps, stores the serialized
//! payload and returns it. Provider failures surface as `UpstreamError` and
//! are never cached.

use rocket::State;
use rocket::http::ContentType;
use rocket::serde::json::Json;
use serde_json::Value;
use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::error::ApiError;
use crate::messages::sanitize_content;
use crate::models::{
    Channel, Chat, ChatMember, ConversationResponse, Conversations, ShortMessage, Team,
};
use crate::provider::ChatProvider;
use crate::provider::types::{RawChannel, RawChat, RawChatMember, RawMessage, RawTeam};
use crate::threading;

/// Cache key for the full conversation listing.
const CONVERSATIONS_KEY: &str = "conversations";

#[get("/conversations")]
pub async fn list_conversations(
    provider: &State<Arc<dyn ChatProvider>>,
    cache: &State<ResponseCache>,
) -> Result<Json<Value>, ApiError> {
    let provider = Arc::clone(provider.inner());

    let value = cache
        .get_or_compute(CONVERSATIONS_KEY, move || async move {
            let raw = provider.fetch_conversations().await?;

            let response = Conversations {
                chats: raw.chats.iter().map(map_chat).collect(),
                teams: raw.teams.iter().map(map_team).collect(),
            };

            serde_json::to_value(&response).map_err(|e| {
                ApiError::InternalError(format!("unable to encode conversations: {e}"))
            })
        })
        .await?;

    Ok(Json(value))
}

#[get("/conversations/<id>")]
pub async fn get_conversation(
    id: String,
    provider: &State<Arc<dyn ChatProvider>>,
    cache: &State<ResponseCache>,
) -> Result<Json<Value>, ApiError> {
    let cache_key = format!("{CONVERSATIONS_KEY}/{id}");
    let provider = Arc::clone(provider.inner());

    let value = cache
        .get_or_compute(&cache_key, move || async move {
            let raw = provider.fetch_messages(&id).await?;

            let response = ConversationResponse {
                messages: threading::build_threads(raw),
            };

            serde_json::to_value(&response).map_err(|e| {
                ApiError::InternalError(format!("unable to encode conversation: {e}"))
            })
        })
        .await?;

    Ok(Json(value))
}

#[get("/conversations/<id>/profilePicture")]
pub async fn get_profile_picture(
    id: String,
    provider: &State<Arc<dyn ChatProvider>>,
) -> Result<(ContentType, Vec<u8>), ApiError> {
    let bytes = provider.fetch_profile_picture(&id).await.map_err(|e| {
        log::error!("unable to get profile picture for {}: {}", id, e);
        ApiError::NotFound(format!("no profile picture for '{id}'"))
    })?;

    Ok((ContentType::Binary, bytes))
}

/// Reduce a raw message to its preview form.
fn short_message(message: &RawMessage) -> ShortMessage {
    ShortMessage {
        id: message.id.clone(),
        content: message.content.clone(),
        clean_content: sanitize_content(&message.content),
        from: message.from.clone(),
    }
}

fn map_chat(chat: &RawChat) -> Chat {
    Chat {
        id: chat.id.clone(),
        title: chat.title.clone(),
        last_message: short_message(&chat.last_message),
        is_one_on_one: chat.is_one_on_one,
        creator: chat.creator.clone(),
        is_read: chat.is_read,
        is_last_message_from_me: chat.is_last_message_from_me,
        members: chat.members.iter().map(map_member).collect(),
    }
}

fn map_member(member: &RawChatMember) -> ChatMember {
    ChatMember {
        mri: member.mri.clone(),
        role: member.role.clone(),
        tenant_id: member.tenant_id.clone(),
        object_id: member.object_id.clone(),
    }
}

fn map_team(team: &RawTeam) -> Team {
    Team {
        creator: team.creator.clone(),
        id: team.id.clone(),
        display_name: team.display_name.clone(),
        channels: team.channels.iter().map(map_channel).collect(),
    }
}

fn map_channel(channel: &RawChannel) -> Channel {
    Channel {
        id: channel.id.clone(),
        display_name: channel.display_name.clone(),
        last_message: short_message(&channel.last_message),
        description: channel.description.clone(),
        creator: channel.creator.clone(),
        parent_team_id: channel.parent_team_id.clone(),
    }
}
