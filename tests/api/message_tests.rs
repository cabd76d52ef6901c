//! Message and Reaction API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{TestApp, ALICE, BOB, CAROL, GENERAL};

#[tokio::test]
async fn test_send_channel_message_resolves_mentions() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_as(
            ALICE,
            "/api/v1/messages",
            json!({ "content": "hey @bob @carol and @nobody", "channel_id": GENERAL.to_string() }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["author_id"], ALICE.to_string());
    assert_eq!(body["channel_id"], GENERAL.to_string());
    assert_eq!(body["mentions"], json!([BOB.to_string(), CAROL.to_string()]));
    assert_eq!(body["reactions"], json!({}));
    assert_eq!(body["read"], false);
    assert!(body.get("recipient_id").is_none());
}

#[tokio::test]
async fn test_punctuated_handle_is_not_a_mention() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_as(
            ALICE,
            "/api/v1/messages",
            json!({ "content": "hey @bob, @carol", "channel_id": GENERAL.to_string() }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["mentions"], json!([CAROL.to_string()]));
}

#[tokio::test]
async fn test_send_direct_message() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_as(
            ALICE,
            "/api/v1/messages",
            json!({ "content": "just between us", "recipient_id": BOB.to_string() }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["recipient_id"], BOB.to_string());
    assert!(body.get("channel_id").is_none());
}

#[tokio::test]
async fn test_send_requires_exactly_one_target() {
    let app = TestApp::new().await;

    let (both, _) = app
        .post_as(
            ALICE,
            "/api/v1/messages",
            json!({ "content": "hi", "channel_id": "1", "recipient_id": "2" }),
        )
        .await;
    let (neither, _) = app
        .post_as(ALICE, "/api/v1/messages", json!({ "content": "hi" }))
        .await;

    assert_eq!(both, StatusCode::BAD_REQUEST);
    assert_eq!(neither, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.message_count(), 0);
}

#[tokio::test]
async fn test_send_to_unknown_channel_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_as(
            ALICE,
            "/api/v1/messages",
            json!({ "content": "hello?", "channel_id": "999" }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Channel not found");
}

#[tokio::test]
async fn test_reaction_toggle_adds_then_removes() {
    let app = TestApp::new().await;
    let message_id = app.say(ALICE, "react to this").await;
    let uri = format!("/api/v1/messages/{message_id}/reactions");

    let (status, added) = app.post_as(BOB, &uri, json!({ "emoji": "👍" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(added["action"], "added");
    assert_eq!(added["count"], 1);
    assert_eq!(added["reactions"], json!({ "👍": [BOB.to_string()] }));

    let (_, with_carol) = app.post_as(CAROL, &uri, json!({ "emoji": "👍" })).await;
    assert_eq!(with_carol["count"], 2);

    let (status, removed) = app.post_as(BOB, &uri, json!({ "emoji": "👍" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed["action"], "removed");
    assert_eq!(removed["reactions"], json!({ "👍": [CAROL.to_string()] }));
}

#[tokio::test]
async fn test_last_reaction_removal_drops_emoji() {
    let app = TestApp::new().await;
    let message_id = app.say(ALICE, "one-off").await;
    let uri = format!("/api/v1/messages/{message_id}/reactions");

    app.post_as(BOB, &uri, json!({ "emoji": "🎉" })).await;
    let (_, body) = app.post_as(BOB, &uri, json!({ "emoji": "🎉" })).await;

    assert_eq!(body["count"], 0);
    assert_eq!(body["reactions"], json!({}));
}

#[tokio::test]
async fn test_reaction_on_missing_message() {
    let app = TestApp::new().await;

    let (status, _) = app
        .post_as(BOB, "/api/v1/messages/123456/reactions", json!({ "emoji": "👍" }))
        .await;
    let (bad_id, body) = app
        .post_as(BOB, "/api/v1/messages/not-a-number/reactions", json!({ "emoji": "👍" }))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(bad_id, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid message ID");
}

#[tokio::test]
async fn test_empty_emoji_rejected() {
    let app = TestApp::new().await;
    let message_id = app.say(ALICE, "hi").await;

    let (status, _) = app
        .post_as(
            BOB,
            &format!("/api/v1/messages/{message_id}/reactions"),
            json!({ "emoji": "" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}
