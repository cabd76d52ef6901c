//! # Domain Entities
//!
//! Core domain entities representing the main business objects of the engine.
//!
//! ## Entities
//!
//! - **User**: A registered user, addressable by `@handle`
//! - **Channel**: A named broadcast scope
//! - **Message**: A message with its mentions, reactions and read flag
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer, following the
//! dependency inversion principle. `MentionRepository` owns the inbox read state.

mod channel;
mod mention;
mod message;
mod user;

pub use channel::{Channel, ChannelRepository};
pub use mention::{MentionRepository, MentionSlice};
pub use message::{Message, MessageRepository, MessageTarget};
pub use user::{User, UserDirectory};

#[cfg(test)]
pub use user::MockUserDirectory;
