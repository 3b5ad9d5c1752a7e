/// Authentication utilities
///
/// This module provides the authentication primitives for TaskDesk:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and password rules
/// - [`token`]: Session token issuing, validation and digests
/// - [`middleware`]: Authentication context and bearer header parsing
///
/// # Example
///
/// ```
/// use taskdesk_shared::auth::password::{hash_password, verify_password};
/// use taskdesk_shared::auth::token::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let token = create_token(&Claims::new(Uuid::new_v4()), secret)?;
/// assert!(validate_token(&token, secret).is_ok());
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod password;
pub mod token;
