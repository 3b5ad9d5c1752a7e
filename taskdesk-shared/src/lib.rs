//! # TaskDesk Shared Library
//!
//! This crate contains the data layer and security primitives used by the
//! TaskDesk API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and data structures
//! - `auth`: Password hashing, session tokens, request auth context
//! - `validation`: Field rules for users and tasks
//! - `avatar`: Avatar image normalization
//! - `db`: Connection pool and migrations

pub mod auth;
pub mod avatar;
pub mod db;
pub mod models;
pub mod validation;

/// Current version of the TaskDesk shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
