//! Data Transfer Objects
//!
//! Request and response shapes for the HTTP API and gateway payloads.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;
