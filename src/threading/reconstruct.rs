//! Core reconstruction pass: flat provider stream in, ordered threads out.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::messages::sanitize_content;
use crate::models::{Message, ShortMessage};
use crate::provider::types::{RawEmotion, RawMessage};

/// Build the threaded conversation view from the raw message stream.
///
/// The result is deterministic for a given input multiset: roots and replies
/// are sorted by ascending sequence id, ties broken by input order.
pub fn build_threads(raw: Vec<RawMessage>) -> Vec<Message> {
    let mut roots: Vec<Message> = Vec::new();
    let mut root_index: HashMap<String, usize> = HashMap::new();
    let mut reply_groups: HashMap<String, Vec<Message>> = HashMap::new();

    for raw_message in &raw {
        let message = clean_message(raw_message);
        if message.parent_id == message.short.id {
            root_index.insert(message.short.id.clone(), roots.len());
            roots.push(message);
        } else {
            reply_groups
                .entry(message.parent_id.clone())
                .or_default()
                .push(message);
        }
    }

    for (parent_id, mut group) in reply_groups {
        match root_index.get(&parent_id) {
            Some(&index) => {
                group.sort_by_key(|message| message.sequence_id);
                roots[index].replies = group;
            }
            None => {
                log::warn!(
                    "dropping {} replies to unknown thread root {}",
                    group.len(),
                    parent_id
                );
            }
        }
    }

    roots.sort_by_key(|message| message.sequence_id);
    roots
}

/// Derive the processed message from a raw record.
fn clean_message(raw: &RawMessage) -> Message {
    let parent_id = parse_parent_id(&raw.conversation_link).unwrap_or_else(|| raw.id.clone());

    Message {
        short: ShortMessage {
            id: raw.id.clone(),
            content: raw.content.clone(),
            clean_content: sanitize_content(&raw.content),
            from: raw.from.clone(),
        },
        im_display_name: raw.im_display_name.clone(),
        original_arrival_time: raw.original_arrival_time,
        conversation_id: raw.conversation_id.clone(),
        parent_id,
        sequence_id: raw.sequence_id,
        message_type: raw.message_type.clone(),
        kind: raw.kind.clone(),
        subject: raw.properties.subject.clone(),
        title: raw.properties.title.clone(),
        reactions: aggregate_reactions(&raw.properties.emotions),
        replies: Vec::new(),
    }
}

/// Extract the parent message id from a conversation link.
///
/// The link carries at most one `;messageid=<id>` parameter after the
/// conversation path. Anything that does not match that shape resolves to
/// `None` and the caller falls back to treating the message as its own root.
fn parse_parent_id(link: &str) -> Option<String> {
    let mut segments = link.split(';');
    segments.next()?;
    let parameter = segments.next()?;
    if segments.next().is_some() {
        return None;
    }

    let (key, value) = parameter.split_once('=')?;
    if key != "messageid" || value.is_empty() {
        return None;
    }
    Some(value.to_string())
}

/// Aggregate reaction labels case-insensitively into distinct-user counts.
fn aggregate_reactions(emotions: &[RawEmotion]) -> BTreeMap<String, usize> {
    let mut users_by_label: BTreeMap<String, HashSet<&str>> = BTreeMap::new();
    for emotion in emotions {
        let users = users_by_label
            .entry(emotion.key.to_lowercase())
            .or_default();
        for user in &emotion.users {
            users.insert(user.as_str());
        }
    }

    users_by_label
        .into_iter()
        .map(|(label, users)| (label, users.len()))
        .collect()
}
