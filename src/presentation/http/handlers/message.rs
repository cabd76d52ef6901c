//! Message Handlers

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{SendMessageRequest, ToggleReactionRequest};
use crate::application::dto::response::{MessageResponse, ReactionResponse};
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

/// Send a message to a channel or a user
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let request = body.into_dto()?;

    let distribution = state.messages.send_message(auth.user_id, request).await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(&distribution.message))))
}

/// Toggle the caller's reaction on a message
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(message_id): Path<String>,
    Json(body): Json<ToggleReactionRequest>,
) -> Result<Json<ReactionResponse>, AppError> {
    let message_id: i64 = message_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid message ID".into()))?;

    body.validate().map_err(validation_error)?;

    let result = state
        .reactions
        .toggle_reaction(message_id, auth.user_id, &body.emoji)
        .await?;

    Ok(Json(ReactionResponse::from(result)))
}
