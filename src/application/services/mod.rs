//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **MessageService**: Send a message and fan out its notifications
//! - **ReactionService**: Toggle emoji reactions with optimistic retries
//! - **MentionService**: Mention inbox listing and read-state transitions
//! - **RelayService**: Typing indicators and channel joins
//! - **UserService**: User search for mention autocompletion

pub mod mention_service;
pub mod message_service;
pub mod reaction_service;
pub mod relay_service;
pub mod user_service;

// Re-export message service types
pub use message_service::{CreateMessageDto, Distribution, MessageError, MessageService, MessageServiceImpl};

// Re-export reaction service types
pub use reaction_service::{ReactionError, ReactionResult, ReactionService, ReactionServiceImpl};

// Re-export mention service types
pub use mention_service::{
    ListMentionsDto, MarkReadSelector, MentionError, MentionPage, MentionService, MentionServiceImpl,
};

// Re-export relay service types
pub use relay_service::{RelayError, RelayService, RelayServiceImpl};

// Re-export user service types
pub use user_service::{UserDto, UserError, UserService, UserServiceImpl};
