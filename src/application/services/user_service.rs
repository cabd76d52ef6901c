//! User Service
//!
//! Read-only user lookups used by clients composing mentions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{User, UserDirectory};
use crate::shared::error::AppError;

/// Maximum number of results returned by a user search
pub const SEARCH_LIMIT: u32 = 5;

/// User service trait
#[async_trait]
pub trait UserService: Send + Sync {
    /// Users whose handle contains `query`, for mention autocompletion.
    async fn search_users(&self, query: &str) -> Result<Vec<UserDto>, UserError>;
}

/// User data transfer object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDto {
    pub id: String,
    pub username: String,
    pub avatar_url: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            avatar_url: user.avatar_url,
        }
    }
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Internal error: {0}")]
    Internal(String),
}

/// UserService implementation
pub struct UserServiceImpl {
    users: Arc<dyn UserDirectory>,
}

impl UserServiceImpl {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserService for UserServiceImpl {
    async fn search_users(&self, query: &str) -> Result<Vec<UserDto>, UserError> {
        let users = self
            .users
            .search(query.trim(), SEARCH_LIMIT)
            .await
            .map_err(|e| UserError::Internal(e.to_string()))?;

        Ok(users.into_iter().map(UserDto::from).collect())
    }
}

impl From<UserError> for AppError {
    fn from(e: UserError) -> Self {
        match e {
            UserError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockUserDirectory;

    #[tokio::test]
    async fn test_search_trims_and_limits() {
        let mut users = MockUserDirectory::new();
        users
            .expect_search()
            .withf(|query, limit| query == "bo" && *limit == SEARCH_LIMIT)
            .times(1)
            .returning(|_, _| Ok(vec![User::new(2, "bob"), User::new(9, "bobby")]));
        let service = UserServiceImpl::new(Arc::new(users));

        let found = service.search_users("  bo ").await.unwrap();

        let names: Vec<_> = found.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["bob", "bobby"]);
        assert_eq!(found[0].id, "2");
    }

    #[tokio::test]
    async fn test_search_maps_directory_errors() {
        let mut users = MockUserDirectory::new();
        users
            .expect_search()
            .returning(|_, _| Err(crate::shared::error::AppError::Internal("down".into())));
        let service = UserServiceImpl::new(Arc::new(users));

        assert!(matches!(service.search_users("x").await, Err(UserError::Internal(_))));
    }
}
