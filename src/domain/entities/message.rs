//! Message entity and repository trait.
//!
//! Maps to the `messages` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::ReactionMap;
use crate::shared::error::AppError;

/// Where a message is delivered. Exactly one of channel or direct recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MessageTarget {
    /// Posted into a channel
    Channel(i64),
    /// Sent directly to one user
    Direct(i64),
}

impl MessageTarget {
    /// Build a target from the optional pair clients send.
    ///
    /// Returns `None` when both or neither are present.
    pub fn from_parts(channel_id: Option<i64>, recipient_id: Option<i64>) -> Option<Self> {
        match (channel_id, recipient_id) {
            (Some(channel_id), None) => Some(Self::Channel(channel_id)),
            (None, Some(recipient_id)) => Some(Self::Direct(recipient_id)),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Channel(_) => "channel",
            Self::Direct(_) => "direct",
        }
    }
}

/// Represents a chat message.
///
/// Maps to the `messages` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - author_id: BIGINT NOT NULL REFERENCES users(id)
/// - content: TEXT NOT NULL
/// - channel_id: BIGINT NULL REFERENCES channels(id)
/// - recipient_id: BIGINT NULL REFERENCES users(id)
/// - mentions: BIGINT[] NOT NULL (resolved once, at creation)
/// - reactions: JSONB NOT NULL
/// - read: BOOLEAN NOT NULL DEFAULT FALSE
/// - version: BIGINT NOT NULL DEFAULT 0 (bumped on every reaction write)
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
///
/// A CHECK constraint keeps exactly one of channel_id/recipient_id set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Snowflake ID (primary key)
    pub id: i64,

    pub author_id: i64,

    pub content: String,

    pub target: MessageTarget,

    /// Mentioned user IDs in the order they appear in `content`, duplicates kept
    pub mentions: Vec<i64>,

    pub reactions: ReactionMap,

    /// Shared by every mentioned user
    pub read: bool,

    /// Optimistic concurrency token for reaction writes
    pub version: i64,

    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A fresh, unpersisted message.
    pub fn new(id: i64, author_id: i64, content: String, target: MessageTarget, mentions: Vec<i64>) -> Self {
        Self {
            id,
            author_id,
            content,
            target,
            mentions,
            reactions: ReactionMap::new(),
            read: false,
            version: 0,
            created_at: Utc::now(),
        }
    }

    pub fn channel_id(&self) -> Option<i64> {
        match self.target {
            MessageTarget::Channel(id) => Some(id),
            MessageTarget::Direct(_) => None,
        }
    }

    pub fn recipient_id(&self) -> Option<i64> {
        match self.target {
            MessageTarget::Direct(id) => Some(id),
            MessageTarget::Channel(_) => None,
        }
    }

    /// Check whether `user_id` is mentioned at least once.
    pub fn mentions_user(&self, user_id: i64) -> bool {
        self.mentions.contains(&user_id)
    }
}

/// Repository trait for Message data access operations.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find a message by its Snowflake ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError>;

    /// Persist a new message and return the stored row, whose timestamp is canonical.
    async fn create(&self, message: &Message) -> Result<Message, AppError>;

    /// Replace the reaction map if the stored version still equals `expected_version`.
    ///
    /// Returns `false` when another writer got there first (or the row is gone);
    /// the caller re-reads and retries.
    async fn update_reactions(
        &self,
        id: i64,
        expected_version: i64,
        reactions: &ReactionMap,
    ) -> Result<bool, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_parts() {
        assert_eq!(MessageTarget::from_parts(Some(7), None), Some(MessageTarget::Channel(7)));
        assert_eq!(MessageTarget::from_parts(None, Some(3)), Some(MessageTarget::Direct(3)));
        assert_eq!(MessageTarget::from_parts(Some(7), Some(3)), None);
        assert_eq!(MessageTarget::from_parts(None, None), None);
    }

    #[test]
    fn test_target_accessors() {
        let mut message = Message::new(1, 2, "hi".into(), MessageTarget::Channel(7), vec![]);
        assert_eq!(message.channel_id(), Some(7));
        assert_eq!(message.recipient_id(), None);

        message.target = MessageTarget::Direct(5);
        assert_eq!(message.channel_id(), None);
        assert_eq!(message.recipient_id(), Some(5));
    }

    #[test]
    fn test_mentions_user() {
        let message = Message::new(1, 2, "@a @a".into(), MessageTarget::Channel(7), vec![4, 4]);
        assert!(message.mentions_user(4));
        assert!(!message.mentions_user(2));
    }
}
