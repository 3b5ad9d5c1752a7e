/// Session token list
///
/// Each row records one issued session token by its SHA-256 digest. Rows
/// for a user, ordered by `id`, form that user's token list: the signup
/// token first, then one entry per login.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE user_sessions (
///     id BIGSERIAL PRIMARY KEY,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token_hash VARCHAR(64) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgExecutor, PgPool};
use uuid::Uuid;

use super::user::User;

/// One entry of a user's token list
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Monotonic ID; defines token list order
    pub id: i64,

    /// Owning user
    pub user_id: Uuid,

    /// SHA-256 hex digest of the bearer token
    pub token_hash: String,

    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Appends a token digest to the user's token list
    pub async fn create<'e, E>(
        executor: E,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO user_sessions (user_id, token_hash)
            VALUES ($1, $2)
            RETURNING id, user_id, token_hash, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_one(executor)
        .await?;

        Ok(session)
    }

    /// Finds the user owning `token_hash`
    ///
    /// Both the user ID from the token claims and the digest must match,
    /// so a token is only honored for the account it was issued to.
    pub async fn find_user_by_token(
        pool: &PgPool,
        user_id: Uuid,
        token_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.age, u.created_at, u.updated_at
            FROM users u
            JOIN user_sessions s ON s.user_id = u.id
            WHERE u.id = $1 AND s.token_hash = $2
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists a user's token list in issue order
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let sessions = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token_hash, created_at
            FROM user_sessions
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    /// Removes one token from the user's list
    ///
    /// # Returns
    ///
    /// True if the token was on the list
    pub async fn delete(pool: &PgPool, user_id: Uuid, token_hash: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1 AND token_hash = $2")
            .bind(user_id)
            .bind(token_hash)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clears the user's token list
    ///
    /// # Returns
    ///
    /// Number of tokens revoked
    pub async fn delete_all_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
