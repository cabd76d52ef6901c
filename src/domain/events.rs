//! Outbound notification events.
//!
//! The engine builds event payloads and picks their audience; delivering
//! them to sockets is the job of a `NotificationSink`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::Message;
use crate::shared::snowflake::serde_id;

/// Who should receive an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Audience {
    /// Every connected client
    Everyone,
    /// All sessions of a single user
    User(i64),
}

impl Audience {
    /// Whether a session belonging to `user_id` is part of this audience.
    pub fn includes(&self, user_id: i64) -> bool {
        match self {
            Self::Everyone => true,
            Self::User(id) => *id == user_id,
        }
    }
}

/// Events pushed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "d", rename_all = "snake_case")]
pub enum ChatEvent {
    NewMessage(NewMessageEvent),
    NewMention(NewMentionEvent),
    ReactionAdded(ReactionAddedEvent),
    UserTyping(UserTypingEvent),
    UserJoined(UserJoinedEvent),
}

impl ChatEvent {
    /// Get the event name for dispatch
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::NewMessage(_) => "new_message",
            Self::NewMention(_) => "new_mention",
            Self::ReactionAdded(_) => "reaction_added",
            Self::UserTyping(_) => "user_typing",
            Self::UserJoined(_) => "user_joined",
        }
    }

    /// Payload without the event name envelope
    pub fn to_json(&self) -> serde_json::Value {
        let value = match self {
            Self::NewMessage(e) => serde_json::to_value(e),
            Self::NewMention(e) => serde_json::to_value(e),
            Self::ReactionAdded(e) => serde_json::to_value(e),
            Self::UserTyping(e) => serde_json::to_value(e),
            Self::UserJoined(e) => serde_json::to_value(e),
        };
        value.unwrap_or_default()
    }
}

/// Broadcast for every newly stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessageEvent {
    #[serde(with = "serde_id")]
    pub id: i64,
    pub content: String,
    #[serde(with = "serde_id")]
    pub user_id: i64,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for NewMessageEvent {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            content: message.content.clone(),
            user_id: message.author_id,
            timestamp: message.created_at,
        }
    }
}

/// Sent to one mentioned user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMentionEvent {
    #[serde(with = "serde_id")]
    pub message_id: i64,
    pub content: String,
    #[serde(with = "serde_id")]
    pub author_id: i64,
    #[serde(default, with = "serde_id::option")]
    pub channel_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

impl From<&Message> for NewMentionEvent {
    fn from(message: &Message) -> Self {
        Self {
            message_id: message.id,
            content: message.content.clone(),
            author_id: message.author_id,
            channel_id: message.channel_id(),
            timestamp: message.created_at,
        }
    }
}

/// Result of a reaction toggle. Sent for removals too, with the new count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionAddedEvent {
    #[serde(with = "serde_id")]
    pub message_id: i64,
    pub emoji: String,
    pub count: usize,
    #[serde(with = "serde_id")]
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTypingEvent {
    #[serde(with = "serde_id")]
    pub user_id: i64,
    #[serde(default, with = "serde_id::option")]
    pub channel_id: Option<i64>,
    #[serde(default, with = "serde_id::option")]
    pub recipient_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserJoinedEvent {
    #[serde(with = "serde_id")]
    pub channel_id: i64,
}

/// An event together with its audience.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub event: ChatEvent,
    pub audience: Audience,
}

impl Notification {
    pub fn everyone(event: ChatEvent) -> Self {
        Self {
            event,
            audience: Audience::Everyone,
        }
    }

    pub fn to_user(event: ChatEvent, user_id: i64) -> Self {
        Self {
            event,
            audience: Audience::User(user_id),
        }
    }
}

/// Delivers notifications to connected clients.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    /// Hand a notification to the transport. Never blocks.
    fn publish(&self, notification: Notification);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MessageTarget;

    #[test]
    fn test_audience_includes() {
        assert!(Audience::Everyone.includes(42));
        assert!(Audience::User(42).includes(42));
        assert!(!Audience::User(42).includes(7));
    }

    #[test]
    fn test_event_envelope() {
        let event = ChatEvent::UserJoined(UserJoinedEvent { channel_id: 7 });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "t": "user_joined", "d": { "channel_id": "7" } }));
        assert_eq!(event.to_json(), serde_json::json!({ "channel_id": "7" }));
    }

    #[test]
    fn test_mention_event_from_direct_message() {
        let message = Message::new(10, 1, "hey @b".into(), MessageTarget::Direct(2), vec![2]);
        let event = NewMentionEvent::from(&message);
        assert_eq!(event.message_id, 10);
        assert_eq!(event.author_id, 1);
        assert_eq!(event.channel_id, None);
    }
}
