//! Mention inbox query parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default number of mentions per inbox page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Read-state filter applied to a user's mentions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl MentionFilter {
    /// Whether a message with the given read flag passes this filter.
    pub fn matches(&self, read: bool) -> bool {
        match self {
            Self::All => true,
            Self::Unread => !read,
            Self::Read => read,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }
}

impl FromStr for MentionFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(Self::All),
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            other => Err(format!("unknown mention filter '{}'", other)),
        }
    }
}

impl fmt::Display for MentionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamp ordering of the inbox. Ties fall back to message ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }

    /// SQL ordering clause for the messages table.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC, id DESC",
            Self::Oldest => "created_at ASC, id ASC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1-indexed page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Pages below 1 are clamped to 1; a zero page size falls back to the default.
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: if per_page == 0 { DEFAULT_PAGE_SIZE } else { per_page },
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }

    /// Total page count for `total` matching rows.
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.limit())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// A full inbox query for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MentionQuery {
    pub filter: MentionFilter,
    pub sort: SortOrder,
    pub page: PageRequest,
}
