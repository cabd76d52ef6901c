//! Reaction Service
//!
//! Toggles emoji reactions with optimistic concurrency: read the message,
//! compute the next reaction snapshot, write it back only if nobody else
//! wrote in between, retry otherwise.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    ChatEvent, MessageRepository, Notification, NotificationSink, ReactionAddedEvent,
    ReactionMap, ToggleOutcome,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Maximum emoji length in bytes (matches the column width)
pub const MAX_EMOJI_LENGTH: usize = 100;

/// Reaction service trait
#[async_trait]
pub trait ReactionService: Send + Sync {
    /// Add `user_id`'s `emoji` reaction if absent, remove it if present.
    async fn toggle_reaction(&self, message_id: i64, user_id: i64, emoji: &str) -> Result<ReactionResult, ReactionError>;
}

/// Outcome of a committed toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionResult {
    pub message_id: i64,
    pub emoji: String,
    pub outcome: ToggleOutcome,
    /// Users left under the emoji after the toggle
    pub count: usize,
    /// Full reaction map as written
    pub reactions: ReactionMap,
}

/// Reaction service errors
#[derive(Debug, thiserror::Error)]
pub enum ReactionError {
    #[error("Message not found")]
    MessageNotFound,

    #[error("Invalid emoji")]
    InvalidEmoji,

    #[error("Reaction update conflicted {attempts} times")]
    Conflict { attempts: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// ReactionService implementation
pub struct ReactionServiceImpl {
    message_repo: Arc<dyn MessageRepository>,
    sink: Arc<dyn NotificationSink>,
    max_retries: u32,
}

impl ReactionServiceImpl {
    pub fn new(message_repo: Arc<dyn MessageRepository>, sink: Arc<dyn NotificationSink>, max_retries: u32) -> Self {
        Self {
            message_repo,
            sink,
            max_retries,
        }
    }

    fn validate_emoji(emoji: &str) -> Result<(), ReactionError> {
        if emoji.trim().is_empty() || emoji.len() > MAX_EMOJI_LENGTH || emoji.chars().any(char::is_whitespace) {
            return Err(ReactionError::InvalidEmoji);
        }
        Ok(())
    }
}

#[async_trait]
impl ReactionService for ReactionServiceImpl {
    async fn toggle_reaction(&self, message_id: i64, user_id: i64, emoji: &str) -> Result<ReactionResult, ReactionError> {
        Self::validate_emoji(emoji)?;

        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            let message = self
                .message_repo
                .find_by_id(message_id)
                .await
                .map_err(|e| ReactionError::Internal(e.to_string()))?
                .ok_or(ReactionError::MessageNotFound)?;

            let toggle = message.reactions.toggle(emoji, user_id);

            let applied = self
                .message_repo
                .update_reactions(message_id, message.version, &toggle.reactions)
                .await
                .map_err(|e| ReactionError::Internal(e.to_string()))?;

            if !applied {
                metrics::record_reaction_conflict();
                tracing::warn!(
                    message_id = message_id,
                    user_id = user_id,
                    attempt = attempt,
                    "Reaction write lost a race, retrying"
                );
                continue;
            }

            self.sink.publish(Notification::everyone(ChatEvent::ReactionAdded(
                ReactionAddedEvent {
                    message_id,
                    emoji: emoji.to_string(),
                    count: toggle.count,
                    user_id,
                },
            )));

            metrics::record_reaction_toggle(toggle.outcome.as_str());
            tracing::debug!(
                message_id = message_id,
                user_id = user_id,
                emoji = %emoji,
                outcome = toggle.outcome.as_str(),
                count = toggle.count,
                "Reaction toggled"
            );

            return Ok(ReactionResult {
                message_id,
                emoji: emoji.to_string(),
                outcome: toggle.outcome,
                count: toggle.count,
                reactions: toggle.reactions,
            });
        }

        Err(ReactionError::Conflict { attempts })
    }
}

impl From<ReactionError> for AppError {
    fn from(e: ReactionError) -> Self {
        match e {
            ReactionError::MessageNotFound => AppError::NotFound("Message not found".into()),
            ReactionError::InvalidEmoji => AppError::Validation(format!(
                "Emoji must be 1-{} bytes without whitespace",
                MAX_EMOJI_LENGTH
            )),
            e @ ReactionError::Conflict { .. } => AppError::Conflict(e.to_string()),
            ReactionError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
