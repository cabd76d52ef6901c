//! Mention read-state repository trait.
//!
//! Every read-state transition of the inbox goes through this trait. The
//! stores shipped with the crate keep one `read` flag per message, shared by
//! all mentioned users; a per-(message, user) table can implement the same
//! trait without touching message distribution or reactions.

use async_trait::async_trait;

use crate::domain::entities::Message;
use crate::domain::value_objects::{MentionQuery, PageRequest, SortOrder};
use crate::shared::error::AppError;

/// One page of mentions plus the size of the full filtered set.
#[derive(Debug, Clone, Default)]
pub struct MentionSlice {
    /// Messages on the requested page, with the read flag as stored before any view side effect
    pub messages: Vec<Message>,
    /// Number of messages matching the filter across all pages
    pub total: u64,
}

/// Repository trait for mention queries and read-state transitions.
#[async_trait]
pub trait MentionRepository: Send + Sync {
    /// Messages mentioning `user_id`, filtered, sorted and paginated.
    async fn find_mentions(&self, user_id: i64, query: &MentionQuery) -> Result<MentionSlice, AppError>;

    /// Number of unread messages mentioning `user_id`.
    async fn count_unread(&self, user_id: i64) -> Result<u64, AppError>;

    /// Flip the given messages to read if they mention `user_id` and are still unread.
    ///
    /// Returns how many actually transitioned; already-read IDs are skipped.
    async fn mark_read(&self, user_id: i64, message_ids: &[i64]) -> Result<u64, AppError>;

    /// Atomically select unread mentions of `user_id` (optionally one page of them
    /// under `sort`) and flip them to read. Returns how many transitioned.
    async fn mark_unread_as_read(
        &self,
        user_id: i64,
        window: Option<(PageRequest, SortOrder)>,
    ) -> Result<u64, AppError>;

    /// Flip a message back to unread.
    ///
    /// Returns `false` if the message does not exist or does not mention `user_id`.
    async fn mark_unread(&self, user_id: i64, message_id: i64) -> Result<bool, AppError>;
}
