//! Repository Implementations
//!
//! PostgreSQL implementations of domain repository traits.
//!
//! ## Available Repositories
//!
//! - **PgUserRepository** - `UserDirectory` lookups and handle search
//! - **PgChannelRepository** - Channel lookups
//! - **PgMessageRepository** - Messages, reactions and the mention inbox
//!   (`MessageRepository` + `MentionRepository`)
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::{
//!     PgChannelRepository, PgMessageRepository, PgUserRepository,
//! };
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let users = PgUserRepository::new(pool.clone());
//!     let channels = PgChannelRepository::new(pool.clone());
//!     let messages = PgMessageRepository::new(pool);
//! }
//! ```

pub mod channel_repository;
pub mod message_repository;
pub mod user_repository;

pub use channel_repository::PgChannelRepository;
pub use message_repository::PgMessageRepository;
pub use user_repository::PgUserRepository;
