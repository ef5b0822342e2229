//! # TaskHive API Server Library
//!
//! HTTP surface over the identity and authorization core in
//! `taskhive-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder and session middleware
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
