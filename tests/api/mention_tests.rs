//! Mention Inbox API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::common::{TestApp, ALICE, BOB, CAROL};

fn ids(page: &Value) -> Vec<String> {
    page["mentions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_viewing_marks_mentions_read() {
    let app = TestApp::new().await;
    let first = app.say(ALICE, "@bob first").await;
    let second = app.say(CAROL, "@bob second").await;
    app.say(ALICE, "@carol not for bob").await;

    let (status, page) = app.get_as(BOB, "/api/v1/mentions").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&page), vec![second.clone(), first.clone()]);
    assert_eq!(page["total"], 2);
    assert_eq!(page["marked_read"], 2);
    // Items are shown as they were before this view
    assert_eq!(page["mentions"][0]["read"], false);

    let (_, again) = app.get_as(BOB, "/api/v1/mentions").await;
    assert_eq!(again["marked_read"], 0);
    assert_eq!(again["mentions"][0]["read"], true);

    let (_, count) = app.get_as(BOB, "/api/v1/mentions/unread_count").await;
    assert_eq!(count["unread"], 0);
}

#[tokio::test]
async fn test_oldest_first_sort() {
    let app = TestApp::new().await;
    let first = app.say(ALICE, "@bob one").await;
    let second = app.say(ALICE, "@bob two").await;

    let (_, page) = app.get_as(BOB, "/api/v1/mentions?sort=oldest").await;

    assert_eq!(page["sort"], "oldest");
    assert_eq!(ids(&page), vec![first, second]);
}

#[tokio::test]
async fn test_unknown_filter_and_sort_fall_back_to_defaults() {
    let app = TestApp::new().await;
    app.say(ALICE, "@bob hi").await;

    let (status, page) = app
        .get_as(BOB, "/api/v1/mentions?filter=starred&sort=sideways")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["filter"], "all");
    assert_eq!(page["sort"], "newest");
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn test_pagination_only_marks_the_viewed_page() {
    let app = TestApp::with_page_size(2).await;
    for i in 0..5 {
        app.say(ALICE, &format!("@bob ping {i}")).await;
    }

    let (_, first_page) = app.get_as(BOB, "/api/v1/mentions?page=1").await;

    assert_eq!(first_page["per_page"], 2);
    assert_eq!(first_page["total"], 5);
    assert_eq!(first_page["pages"], 3);
    assert_eq!(first_page["has_next"], true);
    assert_eq!(first_page["has_prev"], false);

    let (_, count) = app.get_as(BOB, "/api/v1/mentions/unread_count").await;
    assert_eq!(count["unread"], 3);

    let (_, last_page) = app.get_as(BOB, "/api/v1/mentions?page=3").await;
    assert_eq!(ids(&last_page).len(), 1);
    assert_eq!(last_page["has_next"], false);

    let (_, beyond) = app.get_as(BOB, "/api/v1/mentions?page=9").await;
    assert!(ids(&beyond).is_empty());
    assert_eq!(beyond["marked_read"], 0);
}

#[tokio::test]
async fn test_unread_filter_excludes_read_items() {
    let app = TestApp::new().await;
    let old = app.say(ALICE, "@bob old").await;
    app.get_as(BOB, "/api/v1/mentions").await;
    let fresh = app.say(ALICE, "@bob fresh").await;

    let (_, unread) = app.get_as(BOB, "/api/v1/mentions?filter=unread").await;
    assert_eq!(ids(&unread), vec![fresh.clone()]);

    let (_, read) = app.get_as(BOB, "/api/v1/mentions?filter=read").await;
    assert_eq!(ids(&read), vec![fresh, old]);
}

#[tokio::test]
async fn test_mark_all_read() {
    let app = TestApp::new().await;
    for _ in 0..3 {
        app.say(ALICE, "@carol look").await;
    }

    let (status, body) = app
        .post_empty_as(CAROL, "/api/v1/mentions/mark_all_read")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
    assert_eq!(body["message"], "Marked 3 mentions as read");

    let (_, again) = app
        .post_empty_as(CAROL, "/api/v1/mentions/mark_all_read")
        .await;
    assert_eq!(again["count"], 0);
}

#[tokio::test]
async fn test_mark_all_read_with_read_filter_changes_nothing() {
    let app = TestApp::new().await;
    app.say(ALICE, "@carol look").await;

    let (_, body) = app
        .post_empty_as(CAROL, "/api/v1/mentions/mark_all_read?filter=read")
        .await;

    assert_eq!(body["count"], 0);
    let (_, count) = app.get_as(CAROL, "/api/v1/mentions/unread_count").await;
    assert_eq!(count["unread"], 1);
}

#[tokio::test]
async fn test_mark_unread_restores_item() {
    let app = TestApp::new().await;
    let id = app.say(ALICE, "@bob remember this").await;
    app.get_as(BOB, "/api/v1/mentions").await;

    let (status, body) = app
        .post_empty_as(BOB, &format!("/api/v1/mentions/{id}/mark_unread"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Marked as unread");
    let (_, count) = app.get_as(BOB, "/api/v1/mentions/unread_count").await;
    assert_eq!(count["unread"], 1);
}

#[tokio::test]
async fn test_mark_unread_rejects_foreign_mentions() {
    let app = TestApp::new().await;
    let id = app.say(ALICE, "@bob only bob").await;

    let (status, _) = app
        .post_empty_as(CAROL, &format!("/api/v1/mentions/{id}/mark_unread"))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mark_all_read_page_zero_covers_every_page() {
    let app = TestApp::new().await;
    for i in 0..12 {
        app.say(ALICE, &format!("@bob ping {i}")).await;
    }

    let (status, body) = app
        .post_empty_as(BOB, "/api/v1/mentions/mark_all_read?page=0")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 12);
    let (_, count) = app.get_as(BOB, "/api/v1/mentions/unread_count").await;
    assert_eq!(count["unread"], 0);
}

#[tokio::test]
async fn test_mark_all_read_single_page() {
    let app = TestApp::new().await;
    for i in 0..12 {
        app.say(ALICE, &format!("@bob ping {i}")).await;
    }

    let (_, body) = app
        .post_empty_as(BOB, "/api/v1/mentions/mark_all_read?page=1")
        .await;

    assert_eq!(body["count"], 10);
    let (_, count) = app.get_as(BOB, "/api/v1/mentions/unread_count").await;
    assert_eq!(count["unread"], 2);
}

#[tokio::test]
async fn test_non_numeric_page_lists_first_page() {
    let app = TestApp::new().await;
    app.say(ALICE, "@bob hi").await;

    let (status, page) = app.get_as(BOB, "/api/v1/mentions?page=abc").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["page"], 1);
    assert_eq!(page["total"], 1);
}
