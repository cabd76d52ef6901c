//! Channel entity and repository trait.
//!
//! Channel management is owned elsewhere; the engine needs lookups to
//! validate message targets.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Represents a named broadcast channel.
///
/// Maps to the `channels` table:
/// - id: BIGINT PRIMARY KEY
/// - name: VARCHAR(100) UNIQUE NOT NULL
/// - description: VARCHAR(200) NULL
/// - created_at: TIMESTAMPTZ NOT NULL DEFAULT NOW()
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Channel {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            created_at: Utc::now(),
        }
    }
}

/// Repository trait for Channel lookups.
#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Find a channel by its ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Channel>, AppError>;
}
