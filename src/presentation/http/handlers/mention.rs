//! Mention Inbox Handlers

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};

use crate::application::dto::request::MentionQueryParams;
use crate::application::dto::response::{
    MarkAllReadResponse, MarkUnreadResponse, MentionPageResponse, UnreadCountResponse,
};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// One page of the caller's mentions. Unread items on the page become read.
pub async fn list_mentions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<MentionQueryParams>,
) -> Result<Json<MentionPageResponse>, AppError> {
    let page = state
        .mentions
        .list_mentions(auth.user_id, params.to_list_dto())
        .await?;

    Ok(Json(MentionPageResponse::from(page)))
}

/// Mark every unread mention read, or only one page of them when `page` is given
pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<MentionQueryParams>,
) -> Result<Json<MarkAllReadResponse>, AppError> {
    let count = state
        .mentions
        .mark_all_read(auth.user_id, params.to_mark_read_selector())
        .await?;

    Ok(Json(MarkAllReadResponse::new(count)))
}

pub async fn mark_unread(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
) -> Result<Json<MarkUnreadResponse>, AppError> {
    let message_id: i64 = message_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid message ID".into()))?;

    state.mentions.mark_unread(auth.user_id, message_id).await?;

    Ok(Json(MarkUnreadResponse::new(message_id)))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let unread = state.mentions.unread_count(auth.user_id).await?;
    Ok(Json(UnreadCountResponse { unread }))
}
