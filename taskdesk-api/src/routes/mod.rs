/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: Signup, login/logout, profile and avatar endpoints
/// - `tasks`: Owner-scoped task CRUD and listing

pub mod health;
pub mod tasks;
pub mod users;
