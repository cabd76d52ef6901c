//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **ReactionMap**: Emoji to reacting users, toggled snapshot by snapshot
//! - **MentionQuery**: Filter, sort and page for a user's mention inbox

mod mention_query;
mod reactions;

pub use mention_query::*;
pub use reactions::*;
