//! Response DTOs
//!
//! Data structures for API response bodies. IDs are rendered as strings.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::application::services::{MentionPage, ReactionResult, UserDto};
use crate::domain::{Message, MessageTarget, ReactionMap};

/// Emoji → reacting user IDs, as strings
fn reaction_users(reactions: &ReactionMap) -> BTreeMap<String, Vec<String>> {
    reactions
        .iter()
        .map(|(emoji, users)| (emoji.to_string(), users.iter().map(i64::to_string).collect()))
        .collect()
}

/// User response
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl From<UserDto> for UserResponse {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id,
            username: dto.username,
            avatar_url: dto.avatar_url,
        }
    }
}

/// Message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<String>,
    pub mentions: Vec<String>,
    pub reactions: BTreeMap<String, Vec<String>>,
    pub read: bool,
    pub created_at: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        let (channel_id, recipient_id) = match message.target {
            MessageTarget::Channel(id) => (Some(id.to_string()), None),
            MessageTarget::Direct(id) => (None, Some(id.to_string())),
        };

        Self {
            id: message.id.to_string(),
            author_id: message.author_id.to_string(),
            content: message.content.clone(),
            channel_id,
            recipient_id,
            mentions: message.mentions.iter().map(i64::to_string).collect(),
            reactions: reaction_users(&message.reactions),
            read: message.read,
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Reaction toggle response
#[derive(Debug, Serialize)]
pub struct ReactionResponse {
    pub message_id: String,
    pub emoji: String,
    pub action: &'static str,
    pub count: usize,
    pub reactions: BTreeMap<String, Vec<String>>,
}

impl From<ReactionResult> for ReactionResponse {
    fn from(result: ReactionResult) -> Self {
        Self {
            message_id: result.message_id.to_string(),
            emoji: result.emoji,
            action: result.outcome.as_str(),
            count: result.count,
            reactions: reaction_users(&result.reactions),
        }
    }
}

/// One page of the mention inbox
#[derive(Debug, Serialize)]
pub struct MentionPageResponse {
    pub mentions: Vec<MessageResponse>,
    pub filter: &'static str,
    pub sort: &'static str,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
    /// How many of the listed mentions this view flipped to read
    pub marked_read: u64,
}

impl From<MentionPage> for MentionPageResponse {
    fn from(page: MentionPage) -> Self {
        Self {
            filter: page.filter.as_str(),
            sort: page.sort.as_str(),
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            pages: page.pages(),
            has_next: page.has_next(),
            has_prev: page.has_prev(),
            marked_read: page.marked_read,
            mentions: page.items.iter().map(MessageResponse::from).collect(),
        }
    }
}

/// Bulk mark-as-read response
#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub message: String,
    pub count: u64,
}

impl MarkAllReadResponse {
    pub fn new(count: u64) -> Self {
        Self {
            message: format!("Marked {count} mentions as read"),
            count,
        }
    }
}

/// Mark-as-unread response
#[derive(Debug, Serialize)]
pub struct MarkUnreadResponse {
    pub message: String,
    pub id: String,
}

impl MarkUnreadResponse {
    pub fn new(message_id: i64) -> Self {
        Self {
            message: "Marked as unread".to_string(),
            id: message_id.to_string(),
        }
    }
}

/// Unread mention count
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread: u64,
}
