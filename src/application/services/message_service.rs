//! Message Service
//!
//! Sends messages: resolves mentions, persists the message and fans the
//! result out as notifications.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::services::MentionExtractor;
use crate::domain::{
    Audience, ChannelRepository, ChatEvent, Message, MessageRepository, MessageTarget,
    NewMentionEvent, NewMessageEvent, Notification, NotificationSink, UserDirectory,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Maximum message length in characters
pub const MAX_CONTENT_LENGTH: usize = 4000;

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Store a message from `author_id` and publish its notifications.
    async fn send_message(&self, author_id: i64, request: CreateMessageDto) -> Result<Distribution, MessageError>;
}

/// Create message request
#[derive(Debug, Clone)]
pub struct CreateMessageDto {
    pub content: String,
    pub target: MessageTarget,
}

/// A stored message and every notification it produced.
#[derive(Debug, Clone)]
pub struct Distribution {
    pub message: Message,
    /// `new_message` events
    pub broadcast: Vec<Notification>,
    /// One `new_mention` per entry in `message.mentions`
    pub mentions: Vec<Notification>,
}

impl Distribution {
    /// Build the notifications for a stored message.
    ///
    /// Channel messages go to everyone; narrowing to channel members is left
    /// to the transport. Direct messages go to the recipient and the author.
    pub fn for_message(message: Message) -> Self {
        let new_message = ChatEvent::NewMessage(NewMessageEvent::from(&message));

        let broadcast = match message.target {
            MessageTarget::Channel(_) => vec![Notification::everyone(new_message)],
            MessageTarget::Direct(recipient_id) if recipient_id == message.author_id => {
                vec![Notification::to_user(new_message, recipient_id)]
            }
            MessageTarget::Direct(recipient_id) => vec![
                Notification::to_user(new_message.clone(), recipient_id),
                Notification::to_user(new_message, message.author_id),
            ],
        };

        let mention = NewMentionEvent::from(&message);
        let mentions = message
            .mentions
            .iter()
            .map(|&user_id| Notification::to_user(ChatEvent::NewMention(mention.clone()), user_id))
            .collect();

        Self {
            message,
            broadcast,
            mentions,
        }
    }

    /// Mention notifications first, then the broadcast.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.mentions.iter().chain(self.broadcast.iter())
    }

    /// Users that received a mention notification, in order.
    pub fn mentioned_users(&self) -> Vec<i64> {
        self.mentions
            .iter()
            .filter_map(|n| match n.audience {
                Audience::User(id) => Some(id),
                Audience::Everyone => None,
            })
            .collect()
    }
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Channel not found")]
    ChannelNotFound,

    #[error("Recipient not found")]
    RecipientNotFound,

    #[error("Message content is empty")]
    EmptyContent,

    #[error("Message too long")]
    ContentTooLong,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// MessageService implementation
pub struct MessageServiceImpl {
    message_repo: Arc<dyn MessageRepository>,
    channel_repo: Arc<dyn ChannelRepository>,
    users: Arc<dyn UserDirectory>,
    sink: Arc<dyn NotificationSink>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl MessageServiceImpl {
    pub fn new(
        message_repo: Arc<dyn MessageRepository>,
        channel_repo: Arc<dyn ChannelRepository>,
        users: Arc<dyn UserDirectory>,
        sink: Arc<dyn NotificationSink>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            message_repo,
            channel_repo,
            users,
            sink,
            id_generator,
        }
    }

    fn validate_content(content: &str) -> Result<(), MessageError> {
        if content.trim().is_empty() {
            return Err(MessageError::EmptyContent);
        }
        if content.chars().count() > MAX_CONTENT_LENGTH {
            return Err(MessageError::ContentTooLong);
        }
        Ok(())
    }

    async fn check_target(&self, target: MessageTarget) -> Result<(), MessageError> {
        match target {
            MessageTarget::Channel(channel_id) => {
                self.channel_repo
                    .find_by_id(channel_id)
                    .await
                    .map_err(|e| MessageError::Internal(e.to_string()))?
                    .ok_or(MessageError::ChannelNotFound)?;
            }
            MessageTarget::Direct(recipient_id) => {
                self.users
                    .find_by_id(recipient_id)
                    .await
                    .map_err(|e| MessageError::Internal(e.to_string()))?
                    .ok_or(MessageError::RecipientNotFound)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MessageService for MessageServiceImpl {
    async fn send_message(&self, author_id: i64, request: CreateMessageDto) -> Result<Distribution, MessageError> {
        Self::validate_content(&request.content)?;
        self.check_target(request.target).await?;

        let mentions = MentionExtractor::new(self.users.as_ref())
            .extract(&request.content)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?;

        let message = Message::new(
            self.id_generator.generate(),
            author_id,
            request.content,
            request.target,
            mentions,
        );

        let created = self
            .message_repo
            .create(&message)
            .await
            .map_err(|e| MessageError::Internal(e.to_string()))?;

        let distribution = Distribution::for_message(created);
        for notification in distribution.notifications() {
            self.sink.publish(notification.clone());
        }

        metrics::record_message_distributed(
            distribution.message.target.kind(),
            distribution.mentions.len(),
        );
        tracing::info!(
            message_id = distribution.message.id,
            author_id = author_id,
            target = distribution.message.target.kind(),
            mentions = distribution.mentions.len(),
            "Message distributed"
        );

        Ok(distribution)
    }
}

impl From<MessageError> for AppError {
    fn from(e: MessageError) -> Self {
        match e {
            MessageError::ChannelNotFound => AppError::NotFound("Channel not found".into()),
            MessageError::RecipientNotFound => AppError::NotFound("Recipient not found".into()),
            MessageError::EmptyContent => AppError::Validation("Message content must not be empty".into()),
            MessageError::ContentTooLong => AppError::Validation(format!(
                "Message content too long (max {} characters)",
                MAX_CONTENT_LENGTH
            )),
            MessageError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockNotificationSink;
    use crate::infrastructure::memory::MemoryStore;
    use crate::shared::snowflake::DEFAULT_EPOCH;
    use pretty_assertions::assert_eq;

    fn store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store.insert_user(crate::domain::User::new(1, "alice"));
        store.insert_user(crate::domain::User::new(2, "bob"));
        store.insert_user(crate::domain::User::new(3, "carol"));
        store.insert_channel(crate::domain::Channel::new(7, "general"));
        store
    }

    fn service(store: Arc<MemoryStore>, sink: MockNotificationSink) -> MessageServiceImpl {
        MessageServiceImpl::new(
            store.clone(),
            store.clone(),
            store,
            Arc::new(sink),
            Arc::new(SnowflakeGenerator::new(1, DEFAULT_EPOCH)),
        )
    }

    fn channel_message(content: &str) -> CreateMessageDto {
        CreateMessageDto {
            content: content.into(),
            target: MessageTarget::Channel(7),
        }
    }

    #[tokio::test]
    async fn test_channel_message_fans_out_mentions_and_broadcast() {
        let mut sink = MockNotificationSink::new();
        sink.expect_publish().times(3).return_const(());
        let service = service(store(), sink);

        let distribution = service
            .send_message(1, channel_message("hello @bob and @carol"))
            .await
            .unwrap();

        assert_eq!(distribution.message.mentions, vec![2, 3]);
        assert_eq!(distribution.mentioned_users(), vec![2, 3]);
        for notification in &distribution.mentions {
            match &notification.event {
                ChatEvent::NewMention(event) => {
                    assert_eq!(event.message_id, distribution.message.id);
                    assert_eq!(event.channel_id, Some(7));
                    assert_eq!(event.author_id, 1);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(distribution.broadcast.len(), 1);
        assert_eq!(distribution.broadcast[0].audience, Audience::Everyone);
    }

    #[tokio::test]
    async fn test_message_without_mentions_only_broadcasts() {
        let mut sink = MockNotificationSink::new();
        sink.expect_publish()
            .withf(|n| n.audience == Audience::Everyone && n.event.event_name() == "new_message")
            .times(1)
            .return_const(());
        let service = service(store(), sink);

        let distribution = service
            .send_message(1, channel_message("@nobody is here"))
            .await
            .unwrap();

        assert!(distribution.mentions.is_empty());
    }

    #[tokio::test]
    async fn test_direct_message_targets_both_participants() {
        let mut sink = MockNotificationSink::new();
        sink.expect_publish().times(2).return_const(());
        let service = service(store(), sink);

        let distribution = service
            .send_message(
                1,
                CreateMessageDto {
                    content: "psst".into(),
                    target: MessageTarget::Direct(2),
                },
            )
            .await
            .unwrap();

        let audiences: Vec<_> = distribution.broadcast.iter().map(|n| n.audience).collect();
        assert_eq!(audiences, vec![Audience::User(2), Audience::User(1)]);
    }

    #[tokio::test]
    async fn test_duplicate_mentions_notify_twice() {
        let mut sink = MockNotificationSink::new();
        sink.expect_publish().times(3).return_const(());
        let service = service(store(), sink);

        let distribution = service
            .send_message(1, channel_message("@bob @bob"))
            .await
            .unwrap();

        assert_eq!(distribution.mentioned_users(), vec![2, 2]);
    }

    #[tokio::test]
    async fn test_unknown_channel_is_rejected_before_storing() {
        let mut sink = MockNotificationSink::new();
        sink.expect_publish().never();
        let store = store();
        let service = service(store.clone(), sink);

        let result = service
            .send_message(
                1,
                CreateMessageDto {
                    content: "hi".into(),
                    target: MessageTarget::Channel(99),
                },
            )
            .await;

        assert!(matches!(result, Err(MessageError::ChannelNotFound)));
        assert_eq!(store.message_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_rejected() {
        let mut sink = MockNotificationSink::new();
        sink.expect_publish().never();
        let service = service(store(), sink);

        let result = service
            .send_message(
                1,
                CreateMessageDto {
                    content: "hi".into(),
                    target: MessageTarget::Direct(404),
                },
            )
            .await;

        assert!(matches!(result, Err(MessageError::RecipientNotFound)));
    }

    #[tokio::test]
    async fn test_blank_content_is_rejected() {
        let mut sink = MockNotificationSink::new();
        sink.expect_publish().never();
        let service = service(store(), sink);

        let result = service.send_message(1, channel_message("   \n")).await;

        assert!(matches!(result, Err(MessageError::EmptyContent)));
    }
}
