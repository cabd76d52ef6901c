//! Mention extraction.
//!
//! A token is a mention candidate when it starts with `@`; the handle is
//! everything after the `@`, punctuation included. Handles are resolved
//! through the user directory and unknown handles are dropped silently.

use crate::domain::entities::UserDirectory;
use crate::shared::error::AppError;

/// Handles of every `@token` in `text`, in order of appearance.
///
/// Pure tokenizer; no lookups. A bare `@` yields no candidate.
pub fn mention_candidates(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .filter_map(|token| token.strip_prefix('@'))
        .filter(|handle| !handle.is_empty())
}

/// Resolves `@handle` mentions to user IDs.
pub struct MentionExtractor<'a> {
    directory: &'a dyn UserDirectory,
}

impl<'a> MentionExtractor<'a> {
    pub fn new(directory: &'a dyn UserDirectory) -> Self {
        Self { directory }
    }

    /// Resolve every mention in `text`.
    ///
    /// Duplicates are kept in encounter order. Errors only when the
    /// directory itself fails.
    pub async fn extract(&self, text: &str) -> Result<Vec<i64>, AppError> {
        let mut mentions = Vec::new();

        for handle in mention_candidates(text) {
            match self.directory.find_by_handle(handle).await? {
                Some(user) => mentions.push(user.id),
                None => tracing::trace!(handle = %handle, "Unresolved mention dropped"),
            }
        }

        Ok(mentions)
    }
}
