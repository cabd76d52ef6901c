//! Mention Service
//!
//! A user's mention inbox: filtered, sorted, paginated, with read state.
//!
//! Listing is not read-only. Every unread mention on the returned page is
//! marked read as it is viewed, so two identical `list_mentions` calls in a
//! row see different read flags.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    MentionFilter, MentionQuery, MentionRepository, Message, PageRequest, SortOrder,
};
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Mention service trait
#[async_trait]
pub trait MentionService: Send + Sync {
    /// One page of `user_id`'s mentions. Unread items on the page become read.
    async fn list_mentions(&self, user_id: i64, request: ListMentionsDto) -> Result<MentionPage, MentionError>;

    /// Mark unread mentions read, either all of them or one page. Returns how many changed.
    async fn mark_all_read(&self, user_id: i64, selector: MarkReadSelector) -> Result<u64, MentionError>;

    /// Put a single mention back to unread.
    async fn mark_unread(&self, user_id: i64, message_id: i64) -> Result<(), MentionError>;

    /// Number of unread mentions.
    async fn unread_count(&self, user_id: i64) -> Result<u64, MentionError>;
}

/// Inbox listing parameters. The page size is fixed by configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListMentionsDto {
    pub filter: MentionFilter,
    pub sort: SortOrder,
    /// 1-indexed
    pub page: u32,
}

/// Which unread mentions a bulk mark-read applies to.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkReadSelector {
    /// Restrict to this page of the unread set; `None` means every unread mention
    pub page: Option<u32>,
    /// `Some(Read)` selects nothing
    pub filter: Option<MentionFilter>,
    /// Ordering used to cut the page
    pub sort: SortOrder,
}

/// A page of the mention inbox.
#[derive(Debug, Clone)]
pub struct MentionPage {
    /// Messages as they were before this view marked them read
    pub items: Vec<Message>,
    pub filter: MentionFilter,
    pub sort: SortOrder,
    pub page: u32,
    pub per_page: u32,
    /// Matching mentions across all pages
    pub total: u64,
    /// How many items this view transitioned to read
    pub marked_read: u64,
}

impl MentionPage {
    pub fn pages(&self) -> u64 {
        PageRequest::new(self.page, self.per_page).page_count(self.total)
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Mention service errors
#[derive(Debug, thiserror::Error)]
pub enum MentionError {
    #[error("Mention not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// MentionService implementation
pub struct MentionServiceImpl {
    mention_repo: Arc<dyn MentionRepository>,
    page_size: u32,
}

impl MentionServiceImpl {
    pub fn new(mention_repo: Arc<dyn MentionRepository>, page_size: u32) -> Self {
        Self { mention_repo, page_size }
    }
}

#[async_trait]
impl MentionService for MentionServiceImpl {
    async fn list_mentions(&self, user_id: i64, request: ListMentionsDto) -> Result<MentionPage, MentionError> {
        let query = MentionQuery {
            filter: request.filter,
            sort: request.sort,
            page: PageRequest::new(request.page, self.page_size),
        };

        let slice = self
            .mention_repo
            .find_mentions(user_id, &query)
            .await
            .map_err(|e| MentionError::Internal(e.to_string()))?;

        let unread: Vec<i64> = slice
            .messages
            .iter()
            .filter(|m| !m.read)
            .map(|m| m.id)
            .collect();

        // A concurrent view may flip some of these first; the count only covers ours
        let marked_read = if unread.is_empty() {
            0
        } else {
            self.mention_repo
                .mark_read(user_id, &unread)
                .await
                .map_err(|e| MentionError::Internal(e.to_string()))?
        };

        metrics::record_mentions_marked_read("view", marked_read);
        tracing::debug!(
            user_id = user_id,
            filter = %query.filter,
            sort = %query.sort,
            page = query.page.page(),
            returned = slice.messages.len(),
            marked_read = marked_read,
            "Mentions listed"
        );

        Ok(MentionPage {
            items: slice.messages,
            filter: query.filter,
            sort: query.sort,
            page: query.page.page(),
            per_page: query.page.per_page(),
            total: slice.total,
            marked_read,
        })
    }

    async fn mark_all_read(&self, user_id: i64, selector: MarkReadSelector) -> Result<u64, MentionError> {
        // The read filter is hidden in clients; honour it as an empty selection
        if selector.filter == Some(MentionFilter::Read) {
            return Ok(0);
        }

        let window = selector
            .page
            .map(|page| (PageRequest::new(page, self.page_size), selector.sort));

        let count = self
            .mention_repo
            .mark_unread_as_read(user_id, window)
            .await
            .map_err(|e| MentionError::Internal(e.to_string()))?;

        metrics::record_mentions_marked_read("bulk", count);
        tracing::info!(user_id = user_id, page = ?selector.page, count = count, "Mentions marked read");

        Ok(count)
    }

    async fn mark_unread(&self, user_id: i64, message_id: i64) -> Result<(), MentionError> {
        let found = self
            .mention_repo
            .mark_unread(user_id, message_id)
            .await
            .map_err(|e| MentionError::Internal(e.to_string()))?;

        if !found {
            return Err(MentionError::NotFound);
        }

        tracing::debug!(user_id = user_id, message_id = message_id, "Mention marked unread");
        Ok(())
    }

    async fn unread_count(&self, user_id: i64) -> Result<u64, MentionError> {
        self.mention_repo
            .count_unread(user_id)
            .await
            .map_err(|e| MentionError::Internal(e.to_string()))
    }
}

impl From<MentionError> for AppError {
    fn from(e: MentionError) -> Self {
        match e {
            MentionError::NotFound => AppError::NotFound("Mention not found".into()),
            MentionError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
