//! User entity and directory trait.
//!
//! Registration, login and profile editing live outside this crate; the
//! engine only reads users to resolve mentions and validate recipients.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a chat user.
///
/// Maps to the `users` table:
/// - id: BIGINT PRIMARY KEY (Snowflake ID)
/// - username: VARCHAR(80) UNIQUE NOT NULL (the @handle)
/// - avatar_url: VARCHAR(200) NULL
/// - bio: VARCHAR(500) NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique handle, matched exactly by `@handle` mentions
    pub username: String,

    pub avatar_url: Option<String>,

    pub bio: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            avatar_url: None,
            bio: None,
            created_at: Utc::now(),
        }
    }
}

/// Read access to registered users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Find a user by exact handle.
    async fn find_by_handle(&self, handle: &str) -> Result<Option<User>, AppError>;

    /// Users whose handle contains `query` (case-insensitive), ordered by handle.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<User>, AppError>;
}
