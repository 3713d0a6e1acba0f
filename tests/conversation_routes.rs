//! End-to-end tests for the conversation endpoints, driving the full
//! cache -> provider fetch -> reconstruction pipeline through Rocket's local
//! client with a stub provider in place of the HTTP transport.

use async_trait::async_trait;
use chatbridge::models::{ConversationResponse, Conversations};
use chatbridge::provider::types::{RawChat, RawConversations, RawEmotion, RawMessage};
use chatbridge::provider::{ChatProvider, ProviderError};
use chatbridge::routes::conversations::{
    get_conversation, get_profile_picture, list_conversations,
};
use chatbridge::test_support::TestRocketBuilder;
use rocket::http::Status;
use rocket::local::blocking::Client;
use rocket::routes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

struct StubProvider {
    messages: Vec<RawMessage>,
    fail: AtomicBool,
    fetches: AtomicUsize,
}

impl StubProvider {
    fn with_messages(messages: Vec<RawMessage>) -> Self {
        Self {
            messages,
            fail: AtomicBool::new(false),
            fetches: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ChatProvider for StubProvider {
    async fn fetch_conversations(&self) -> Result<RawConversations, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Unauthorized);
        }
        Ok(RawConversations {
            chats: vec![RawChat {
                id: "19:chat".to_string(),
                title: "General".to_string(),
                is_one_on_one: false,
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    async fn fetch_messages(
        &self,
        _conversation_id: &str,
    ) -> Result<Vec<RawMessage>, ProviderError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProviderError::Unauthorized);
        }
        Ok(self.messages.clone())
    }

    async fn fetch_profile_picture(&self, _id: &str) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::Unauthorized)
    }
}

fn conversation_link(parent: &str) -> String {
    format!("https://chat.example.invalid/v1/users/ME/conversations/19:demo;messageid={parent}")
}

fn raw_message(id: &str, parent: &str, sequence_id: i64, content: &str) -> RawMessage {
    RawMessage {
        id: id.to_string(),
        content: content.to_string(),
        from: format!("8:user-{id}"),
        conversation_id: "19:demo".to_string(),
        conversation_link: conversation_link(parent),
        sequence_id,
        message_type: "RichText/Html".to_string(),
        kind: "Message".to_string(),
        ..Default::default()
    }
}

fn client_with(stub: Arc<StubProvider>) -> Client {
    TestRocketBuilder::new()
        .mount_api_routes(routes![
            list_conversations,
            get_conversation,
            get_profile_picture
        ])
        .manage_provider(stub)
        .blocking_client()
}

fn demo_messages() -> Vec<RawMessage> {
    let mut root = raw_message(
        "100",
        "100",
        1,
        "<blockquote>earlier</blockquote>take a look",
    );
    root.properties.emotions = vec![
        RawEmotion {
            key: "Like".to_string(),
            users: vec!["8:alice".to_string(), "8:bob".to_string()],
        },
        RawEmotion {
            key: "like".to_string(),
            users: vec!["8:carol".to_string()],
        },
    ];

    vec![
        root,
        raw_message("101", "100", 5, "late reply"),
        raw_message("102", "100", 2, "early reply"),
        raw_message("103", "999", 3, "orphaned reply"),
    ]
}

#[test]
fn conversation_is_reconstructed_and_sanitized() {
    let stub = Arc::new(StubProvider::with_messages(demo_messages()));
    let client = client_with(stub.clone());

    let response = client.get("/api/v1/conversations/19:demo").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let payload: ConversationResponse = response.into_json().expect("valid JSON payload");
    assert_eq!(payload.messages.len(), 1);

    let root = &payload.messages[0];
    assert_eq!(root.short.id, "100");
    assert_eq!(root.short.clean_content, "> earliertake a look");
    assert_eq!(root.reactions.get("like"), Some(&3));

    let reply_ids: Vec<&str> = root.replies.iter().map(|m| m.short.id.as_str()).collect();
    assert_eq!(reply_ids, vec!["102", "101"]);
}

#[test]
fn second_request_is_served_from_cache() {
    let stub = Arc::new(StubProvider::with_messages(demo_messages()));
    let client = client_with(stub.clone());

    let first = client.get("/api/v1/conversations/19:demo").dispatch();
    assert_eq!(first.status(), Status::Ok);
    assert_eq!(stub.fetches.load(Ordering::SeqCst), 1);

    // Even a now-broken provider goes unnoticed while the entry is fresh.
    stub.fail.store(true, Ordering::SeqCst);
    let second = client.get("/api/v1/conversations/19:demo").dispatch();
    assert_eq!(second.status(), Status::Ok);
    assert_eq!(stub.fetches.load(Ordering::SeqCst), 1);
}

#[test]
fn provider_failure_surfaces_as_upstream_error_and_is_not_cached() {
    let stub = Arc::new(StubProvider::with_messages(demo_messages()));
    let client = client_with(stub.clone());

    stub.fail.store(true, Ordering::SeqCst);
    let failed = client.get("/api/v1/conversations/19:demo").dispatch();
    assert_eq!(failed.status(), Status::InternalServerError);

    let body: serde_json::Value = failed.into_json().expect("valid JSON payload");
    assert_eq!(body["error"], "UpstreamError");

    // The failure was not cached; recovery is immediate.
    stub.fail.store(false, Ordering::SeqCst);
    let recovered = client.get("/api/v1/conversations/19:demo").dispatch();
    assert_eq!(recovered.status(), Status::Ok);
    assert_eq!(stub.fetches.load(Ordering::SeqCst), 2);
}

#[test]
fn conversation_listing_maps_chats() {
    let stub = Arc::new(StubProvider::with_messages(Vec::new()));
    let client = client_with(stub.clone());

    let response = client.get("/api/v1/conversations").dispatch();
    assert_eq!(response.status(), Status::Ok);

    let payload: Conversations = response.into_json().expect("valid JSON payload");
    assert_eq!(payload.chats.len(), 1);
    assert_eq!(payload.chats[0].id, "19:chat");
    assert!(payload.teams.is_empty());
}

#[test]
fn missing_profile_picture_returns_not_found() {
    let stub = Arc::new(StubProvider::with_messages(Vec::new()));
    let client = client_with(stub);

    let response = client
        .get("/api/v1/conversations/19:demo/profilePicture")
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);
}
