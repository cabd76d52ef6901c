//! User Search API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{TestApp, ALICE};

#[tokio::test]
async fn test_search_matches_substring_case_insensitively() {
    let app = TestApp::new().await;

    let (status, body) = app.get_as(ALICE, "/api/v1/users/search?q=AR").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["carol"]);
}

#[tokio::test]
async fn test_search_is_limited_to_five() {
    let app = TestApp::new().await;
    let extra = app.seed_random_users(12);
    let query = extra[0].username.chars().next().unwrap();

    let (status, body) = app
        .get_as(ALICE, &format!("/api/v1/users/search?q={query}"))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().is_empty());
    assert!(body.as_array().unwrap().len() <= 5);
}

#[tokio::test]
async fn test_empty_query_matches_any_handle() {
    let app = TestApp::new().await;
    app.seed_random_users(4);

    let (status, body) = app.get_as(ALICE, "/api/v1/users/search?q=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_missing_query_behaves_like_empty() {
    let app = TestApp::new().await;

    let (status, body) = app.get_as(ALICE, "/api/v1/users/search").await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["alice", "bob", "carol"]);
}
