/// Bearer-token authentication for Axum
///
/// [`authenticate`] turns an `Authorization: Bearer <token>` header into an
/// [`AuthContext`]: the token must carry a valid signature and its digest
/// must still be on the owning user's token list. The API crate runs it in
/// a `from_fn_with_state` layer and inserts the context into request
/// extensions.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskdesk_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user.id)
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sqlx::PgPool;

use super::token::{hash_token, validate_token, TokenError};
use crate::models::{session::Session, user::User};

/// Authentication context added to request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The authenticated user
    pub user: User,

    /// The raw bearer token presented with this request
    ///
    /// Needed to log out the current session only.
    pub token: String,
}

/// Error type for authentication
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Authorization header is not `Bearer <token>`
    InvalidFormat(String),

    /// Token signature/claims validation failed
    InvalidToken(String),

    /// Token is well-formed but no longer on the user's token list
    RevokedToken,

    /// Database error
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            _ => (StatusCode::UNAUTHORIZED, "Please authenticate.").into_response(),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// # Errors
///
/// - `MissingCredentials` if the header is absent or not valid UTF-8
/// - `InvalidFormat` if the scheme is not `Bearer` or the token is empty
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }

    Ok(token)
}

/// Authenticates a request from its headers
///
/// Signature and expiry are checked first, so forged or stale tokens are
/// rejected without touching the database.
pub async fn authenticate(
    pool: &PgPool,
    secret: &str,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, secret).map_err(|e| match e {
        TokenError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        TokenError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        _ => AuthError::InvalidToken(format!("Invalid token: {}", e)),
    })?;

    let user = Session::find_user_by_token(pool, claims.sub, &hash_token(token))
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Database error: {}", e)))?
        .ok_or(AuthError::RevokedToken)?;

    Ok(AuthContext {
        user,
        token: token.to_string(),
    })
}
