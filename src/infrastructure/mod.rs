//! Infrastructure Layer
//!
//! Contains implementations of the domain's storage seams:
//! - In-memory store (default backend, test fixture)
//! - Database repositories (PostgreSQL)
//! - Prometheus metrics

pub mod database;
pub mod memory;
pub mod metrics;
pub mod repositories;
