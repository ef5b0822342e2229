//! # TaskHive Shared Library
//!
//! This crate contains the identity and authorization core of TaskHive along
//! with the domain services built on top of it. It is consumed by the API
//! server.
//!
//! ## Module Organization
//!
//! - `auth`: Identity context, session tokens, password hashing, policy gate
//!   and ownership scoping
//! - `models`: Database models, request types and SQL operations
//! - `repository`: Persistence ports with PostgreSQL and in-memory adapters
//! - `services`: Identity registry, credential verifier and domain services
//! - `db`: Connection pool and migrations
//! - `error`: Domain error type shared by all services
//! - `ids`: Unique id generation

pub mod auth;
pub mod db;
pub mod error;
pub mod ids;
pub mod models;
pub mod repository;
pub mod services;

/// Current version of the TaskHive shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
