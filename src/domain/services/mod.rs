//! # Domain Services
//!
//! Domain services encapsulate business logic that doesn't naturally belong
//! to a single entity.
//!
//! ## Services
//!
//! - **MentionExtractor**: Resolves `@handle` tokens in message text to user IDs

mod mention_extractor;

pub use mention_extractor::*;
