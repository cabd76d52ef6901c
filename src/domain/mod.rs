//! # Domain Layer
//!
//! The domain layer contains the core business logic of the engine.
//! It is independent of any external frameworks or infrastructure concerns.
//!
//! ## Structure
//!
//! - **entities**: Users, channels, messages and their repository traits
//! - **value_objects**: Reaction maps and mention inbox queries
//! - **services**: Mention extraction
//! - **events**: Outbound notification payloads and the sink they are published to
//!
//! ## Design Principles
//!
//! - No dependencies on infrastructure or presentation layers
//! - Caller identity is always an explicit parameter
//! - Repository traits define data access contracts

pub mod entities;
pub mod events;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use events::*;
pub use value_objects::*;
