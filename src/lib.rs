//! # Chat Engine Library
//!
//! The message core of a real-time chat backend:
//! - `@handle` mention extraction against the user directory
//! - Emoji reaction toggles with optimistic concurrency
//! - Message distribution to channel and direct-message audiences
//! - A per-user mention inbox with filters, sorting, pagination and read state
//! - A WebSocket gateway that acts as the notification sink
//!
//! Storage is either an in-process store or PostgreSQL.
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Core business entities and repository traits
//! - **Application Layer**: Business logic services and DTOs
//! - **Infrastructure Layer**: In-memory store, PostgreSQL repositories, metrics
//! - **Presentation Layer**: HTTP handlers and WebSocket gateway
//!
//! ## Module Structure
//!
//! ```text
//! chat_engine/
//! +-- config/        Configuration management
//! +-- domain/        Entities, mention extraction, events, repository traits
//! +-- application/   Application services and DTOs
//! +-- infrastructure/ Storage backends and metrics
//! +-- presentation/  HTTP routes and WebSocket handlers
//! +-- shared/        Common utilities (errors, snowflake IDs)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP and WebSocket handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
