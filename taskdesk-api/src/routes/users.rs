/// User account endpoints
///
/// # Endpoints
///
/// - `POST /users` - Sign up, returns the user and a first token
/// - `POST /users/login` - Log in, appends a new token
/// - `POST /users/logout` - Revoke the presenting token
/// - `POST /users/logoutAll` - Revoke every token of the caller
/// - `GET|PATCH|DELETE /users/me` - Read, update, delete own profile
/// - `POST|DELETE /users/me/avatar` - Upload or remove own avatar
/// - `GET /users/:id/avatar` - Public avatar image (PNG)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{parse_id, validate_request, JsonBody},
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taskdesk_shared::{
    auth::{
        middleware::AuthContext,
        password,
        token::{self, Claims},
    },
    avatar,
    models::{
        session::Session,
        user::{CreateUser, UpdateUser, User},
    },
    validation::{
        disallowed_fields, normalize_email, normalize_text, null_fields, FieldError,
        USER_UPDATE_FIELDS,
    },
};
use uuid::Uuid;
use validator::Validate;

/// Public view of a user
///
/// Never carries the password hash, tokens or avatar bytes.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Response for signup and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(email(message = "Email is invalid"))]
    pub email: String,

    /// Checked by `password::validate_password`
    pub password: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: i32,
}

impl SignupRequest {
    fn normalized(self) -> Self {
        Self {
            name: normalize_text(&self.name),
            email: normalize_email(&self.email),
            password: normalize_text(&self.password),
            ..self
        }
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update request
///
/// Built from a body whose keys were already checked against
/// `USER_UPDATE_FIELDS`.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,

    pub password: Option<String>,

    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,
}

impl UpdateUserRequest {
    fn normalized(self) -> Self {
        Self {
            name: self.name.as_deref().map(normalize_text),
            email: self.email.as_deref().map(normalize_email),
            password: self.password.as_deref().map(normalize_text),
            ..self
        }
    }
}

fn password_error(password: &str) -> Option<FieldError> {
    password::validate_password(password)
        .err()
        .map(|message| FieldError::new("password", message))
}

/// Signs a fresh session token for `user_id`
fn issue_token(state: &AppState, user_id: Uuid) -> ApiResult<String> {
    let claims = Claims::with_expiration(
        user_id,
        chrono::Duration::hours(state.config.jwt.expiration_hours),
    );

    Ok(token::create_token(&claims, state.token_secret())?)
}

/// Sign up
///
/// The user row and its first token are written in one transaction.
///
/// # Errors
///
/// - `400 Bad Request`: invalid field, weak password, or email in use
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SignupRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let req = req.normalized();
    validate_request(&req, password_error(&req.password))?;

    let password_hash = password::hash_password(&req.password)?;

    let mut tx = state.db.begin().await?;

    let user = User::create(
        &mut *tx,
        CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            age: req.age,
        },
    )
    .await?;

    let token = issue_token(&state, user.id)?;
    Session::create(&mut *tx, user.id, &token::hash_token(&token)).await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.into(),
            token,
        }),
    ))
}

/// Log in
///
/// Unknown email and wrong password produce the same 400, and both pay for
/// one Argon2id verification.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let unable = || ApiError::BadRequest("Unable to login".to_string());

    // Stored hashes are of the trimmed password
    let candidate = req.password.trim();

    let Some(user) = User::find_by_email(&state.db, &req.email).await? else {
        password::verify_dummy(candidate);
        return Err(unable());
    };

    if !password::verify_password(candidate, &user.password_hash)? {
        tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
        return Err(unable());
    }

    let token = issue_token(&state, user.id)?;
    Session::create(&state.db, user.id, &token::hash_token(&token)).await?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// Log out the presenting token
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    Session::delete(&state.db, auth.user.id, &token::hash_token(&auth.token)).await?;
    Ok(StatusCode::OK)
}

/// Log out every session of the caller
pub async fn logout_all(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    let removed = Session::delete_all_for_user(&state.db, auth.user.id).await?;
    tracing::info!(user_id = %auth.user.id, removed, "Logged out all sessions");
    Ok(StatusCode::OK)
}

/// Read own profile
pub async fn me(Extension(auth): Extension<AuthContext>) -> Json<UserResponse> {
    Json(auth.user.into())
}

/// Update own profile
///
/// # Errors
///
/// - `400 Bad Request`: a key outside `name, email, password, age`
///   ("Invalid updates!"), or an invalid value
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<UserResponse>> {
    if !disallowed_fields(&body, USER_UPDATE_FIELDS).is_empty() {
        return Err(ApiError::BadRequest("Invalid updates!".to_string()));
    }

    let nulls = null_fields(&body);
    if !nulls.is_empty() {
        return Err(ApiError::ValidationError(nulls));
    }

    let req: UpdateUserRequest = serde_json::from_value(Value::Object(body))?;
    let req = req.normalized();
    validate_request(&req, req.password.as_deref().and_then(password_error))?;

    let password_hash = req
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let update = UpdateUser {
        name: req.name,
        email: req.email,
        password_hash,
        age: req.age,
    };

    if update.is_empty() {
        return Ok(Json(auth.user.into()));
    }

    let user = User::update(&state.db, auth.user.id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

/// Delete own account
///
/// Tasks and sessions go with it (foreign keys cascade).
pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    if !User::delete(&state.db, auth.user.id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %auth.user.id, "User deleted");
    Ok(Json(auth.user.into()))
}

/// Upload own avatar
///
/// Expects a multipart field named `avatar`. The image is normalized to a
/// 250×250 PNG on a blocking thread before it is stored.
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> ApiResult<StatusCode> {
    let mut upload: Option<Bytes> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("avatar") {
            continue;
        }

        avatar::check_file_name(field.file_name().unwrap_or_default())?;
        upload = Some(field.bytes().await?);
        break;
    }

    let bytes = upload.ok_or_else(|| ApiError::BadRequest("Please upload an image".to_string()))?;

    let max_bytes = state.config.avatar.max_bytes;
    let png = tokio::task::spawn_blocking(move || avatar::process_avatar(&bytes, max_bytes)).await??;

    User::set_avatar(&state.db, auth.user.id, Some(png)).await?;

    Ok(StatusCode::OK)
}

/// Remove own avatar
pub async fn delete_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<StatusCode> {
    User::set_avatar(&state.db, auth.user.id, None).await?;
    Ok(StatusCode::OK)
}

/// Serve a user's avatar
///
/// # Errors
///
/// - `404 Not Found`: no such user, or the user has no avatar
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id, "Avatar")?;

    let png = User::find_avatar(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Avatar not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_user_response_wire_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let user = User {
            id: Uuid::nil(),
            name: "Mike".to_string(),
            email: "mike@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            age: 27,
            created_at: at,
            updated_at: at,
        };

        let value = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert_eq!(value["_id"], Uuid::nil().to_string());
        assert_eq!(value["name"], "Mike");
        assert_eq!(value["age"], 27);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("password_hash").is_none());
        assert!(value.get("passwordHash").is_none());
    }

    #[test]
    fn test_signup_request_normalized() {
        let req: SignupRequest = serde_json::from_value(json!({
            "name": "  Andrew ",
            "email": " Andrew@Example.COM ",
            "password": "MyPass777!"
        }))
        .unwrap();

        let req = req.normalized();
        assert_eq!(req.name, "Andrew");
        assert_eq!(req.email, "andrew@example.com");
        assert_eq!(req.age, 0);
        assert!(validate_request(&req, password_error(&req.password)).is_ok());
    }

    #[test]
    fn test_signup_request_rejects_blank_name_and_weak_password() {
        let req: SignupRequest = serde_json::from_value(json!({
            "name": "   ",
            "email": "not-an-email",
            "password": "mypassword1",
            "age": -1
        }))
        .unwrap();

        let req = req.normalized();
        match validate_request(&req, password_error(&req.password)) {
            Err(ApiError::ValidationError(errors)) => {
                let mut fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                fields.sort();
                assert_eq!(fields, vec!["age", "email", "name", "password"]);
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_password_trimmed_before_hashing() {
        let req: SignupRequest = serde_json::from_value(json!({
            "name": "Andrew",
            "email": "andrew@example.com",
            "password": "  MyPass777!  "
        }))
        .unwrap();
        assert_eq!(req.normalized().password, "MyPass777!");

        let req: UpdateUserRequest =
            serde_json::from_value(json!({ "password": " pass123@@@\n" })).unwrap();
        assert_eq!(req.normalized().password.as_deref(), Some("pass123@@@"));
    }

    #[test]
    fn test_update_request_only_checks_present_fields() {
        let req: UpdateUserRequest = serde_json::from_value(json!({ "age": 30 })).unwrap();
        let req = req.normalized();

        assert!(validate_request(&req, req.password.as_deref().and_then(password_error)).is_ok());
        assert_eq!(req.age, Some(30));
        assert!(req.name.is_none());
    }
}
