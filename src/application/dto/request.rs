//! Request DTOs
//!
//! Data structures for API request bodies, query strings and gateway payloads.

use serde::Deserialize;
use validator::Validate;

use crate::application::services::{CreateMessageDto, ListMentionsDto, MarkReadSelector};
use crate::domain::{MentionFilter, MessageTarget, SortOrder};
use crate::shared::error::AppError;
use crate::shared::snowflake::serde_id;
use crate::shared::validation::validation_error;

/// Send message request
#[derive(Debug, Deserialize, Validate)]
pub struct SendMessageRequest {
    #[validate(length(min = 1, max = 4000, message = "Content must be 1-4000 characters"))]
    pub content: String,

    #[serde(default, with = "serde_id::option")]
    pub channel_id: Option<i64>,

    #[serde(default, with = "serde_id::option")]
    pub recipient_id: Option<i64>,
}

impl SendMessageRequest {
    /// Validate and resolve the target. Exactly one of channel or recipient is required.
    pub fn into_dto(self) -> Result<CreateMessageDto, AppError> {
        self.validate().map_err(validation_error)?;

        let target = MessageTarget::from_parts(self.channel_id, self.recipient_id).ok_or_else(|| {
            AppError::Validation("Exactly one of channel_id or recipient_id is required".into())
        })?;

        Ok(CreateMessageDto {
            content: self.content,
            target,
        })
    }
}

/// Reaction toggle body (HTTP; the message comes from the path)
#[derive(Debug, Deserialize, Validate)]
pub struct ToggleReactionRequest {
    #[validate(length(min = 1, max = 100, message = "Emoji must be 1-100 bytes"))]
    pub emoji: String,
}

/// Gateway `add_reaction` payload
#[derive(Debug, Deserialize, Validate)]
pub struct AddReactionPayload {
    #[serde(with = "serde_id")]
    pub message_id: i64,

    #[validate(length(min = 1, max = 100, message = "Emoji must be 1-100 bytes"))]
    pub emoji: String,
}

/// Gateway `typing` payload
#[derive(Debug, Deserialize)]
pub struct TypingPayload {
    #[serde(default, with = "serde_id::option")]
    pub channel_id: Option<i64>,

    #[serde(default, with = "serde_id::option")]
    pub recipient_id: Option<i64>,
}

impl TypingPayload {
    pub fn target(&self) -> Result<MessageTarget, AppError> {
        MessageTarget::from_parts(self.channel_id, self.recipient_id).ok_or_else(|| {
            AppError::Validation("Exactly one of channel_id or recipient_id is required".into())
        })
    }
}

/// Gateway `join_channel` payload
#[derive(Debug, Deserialize)]
pub struct JoinChannelPayload {
    #[serde(with = "serde_id")]
    pub channel_id: i64,
}

/// Mention inbox query string.
///
/// Unknown filter or sort values fall back to the defaults (`all`, `newest`).
/// A page that is not a number is treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct MentionQueryParams {
    pub page: Option<String>,
    pub filter: Option<String>,
    pub sort: Option<String>,
}

impl MentionQueryParams {
    fn parsed_page(&self) -> Option<u32> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }

    fn parsed_filter(&self) -> Option<MentionFilter> {
        self.filter.as_deref().and_then(|f| f.parse().ok())
    }

    fn parsed_sort(&self) -> SortOrder {
        self.sort.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    pub fn to_list_dto(&self) -> ListMentionsDto {
        ListMentionsDto {
            filter: self.parsed_filter().unwrap_or_default(),
            sort: self.parsed_sort(),
            page: self.parsed_page().unwrap_or(1),
        }
    }

    pub fn to_mark_read_selector(&self) -> MarkReadSelector {
        MarkReadSelector {
            // Page 0 selects the whole unread set
            page: self.parsed_page().filter(|&page| page > 0),
            filter: self.parsed_filter(),
            sort: self.parsed_sort(),
        }
    }
}

/// User search query string
#[derive(Debug, Default, Deserialize)]
pub struct UserSearchParams {
    #[serde(default)]
    pub q: String,
}
