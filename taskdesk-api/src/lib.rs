//! # TaskDesk API Server Library
//!
//! HTTP layer of TaskDesk: users sign up, authenticate with bearer tokens,
//! manage a profile and avatar, and keep a private list of tasks.
//!
//! ## Modules
//!
//! - `app`: Application state, router and authentication layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors that reject with `ApiError`
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
