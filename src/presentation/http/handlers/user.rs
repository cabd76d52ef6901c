//! User Handlers

use axum::{
    extract::{Query, State},
    Json,
};

use crate::application::dto::request::UserSearchParams;
use crate::application::dto::response::UserResponse;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Mention autocompletion: users whose handle contains `q`
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<UserSearchParams>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.search_users(&params.q).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
