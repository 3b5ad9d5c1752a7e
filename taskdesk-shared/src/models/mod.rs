/// Database models for TaskDesk
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, profile data and inline avatars
/// - `session`: The per-user list of issued session tokens
/// - `task`: Owner-scoped personal tasks
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::user::{User, CreateUser};
/// use taskdesk_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     name: "Mike".to_string(),
///     email: "mike@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     age: 0,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod session;
pub mod task;
pub mod user;
