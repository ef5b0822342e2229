/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Manager registration and login
/// - `users`: Worker management
/// - `projects`: Projects and worker assignment
/// - `holidays`: Holidays

pub mod auth;
pub mod health;
pub mod holidays;
pub mod projects;
pub mod users;
