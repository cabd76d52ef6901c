//! Relay Service
//!
//! Ephemeral events that are forwarded but never stored: typing indicators
//! and channel joins.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    ChannelRepository, ChatEvent, MessageTarget, Notification, NotificationSink, UserJoinedEvent,
    UserTypingEvent,
};
use crate::shared::error::AppError;

/// Relay service trait
#[async_trait]
pub trait RelayService: Send + Sync {
    /// Announce that `user_id` is typing towards `target`.
    async fn typing(&self, user_id: i64, target: MessageTarget) -> Result<(), RelayError>;

    /// Announce that `user_id` opened a channel.
    async fn join_channel(&self, user_id: i64, channel_id: i64) -> Result<(), RelayError>;
}

/// Relay service errors
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Channel not found")]
    ChannelNotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// RelayService implementation
pub struct RelayServiceImpl {
    channel_repo: Arc<dyn ChannelRepository>,
    sink: Arc<dyn NotificationSink>,
}

impl RelayServiceImpl {
    pub fn new(channel_repo: Arc<dyn ChannelRepository>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { channel_repo, sink }
    }
}

#[async_trait]
impl RelayService for RelayServiceImpl {
    async fn typing(&self, user_id: i64, target: MessageTarget) -> Result<(), RelayError> {
        let (channel_id, recipient_id) = match target {
            MessageTarget::Channel(id) => (Some(id), None),
            MessageTarget::Direct(id) => (None, Some(id)),
        };

        self.sink.publish(Notification::everyone(ChatEvent::UserTyping(UserTypingEvent {
            user_id,
            channel_id,
            recipient_id,
        })));
        Ok(())
    }

    async fn join_channel(&self, user_id: i64, channel_id: i64) -> Result<(), RelayError> {
        self.channel_repo
            .find_by_id(channel_id)
            .await
            .map_err(|e| RelayError::Internal(e.to_string()))?
            .ok_or(RelayError::ChannelNotFound)?;

        self.sink
            .publish(Notification::everyone(ChatEvent::UserJoined(UserJoinedEvent { channel_id })));
        tracing::debug!(user_id = user_id, channel_id = channel_id, "User joined channel");
        Ok(())
    }
}

impl From<RelayError> for AppError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::ChannelNotFound => AppError::NotFound("Channel not found".into()),
            RelayError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
