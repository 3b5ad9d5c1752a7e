/// Field rules shared by user and task requests
///
/// Request structs derive [`validator::Validate`] for shape rules (email,
/// lengths, ranges). This module adds what the derive can't express:
/// update-key whitelisting, trimming before checks, and flattening
/// `ValidationErrors` into a list the API can serialize.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::ValidationErrors;

/// Maximum length of a user name
pub const NAME_MAX_LENGTH: u64 = 100;

/// Maximum length of a task description
pub const DESCRIPTION_MAX_LENGTH: u64 = 1000;

/// Keys accepted by a user profile update
pub const USER_UPDATE_FIELDS: &[&str] = &["name", "email", "password", "age"];

/// Keys accepted by a task update
pub const TASK_UPDATE_FIELDS: &[&str] = &["description", "completed"];

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Flattens `validator` output into one `FieldError` per failed rule
///
/// Rules without a custom message fall back to "Invalid value". Output is
/// sorted by field name.
pub fn collect_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut details: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
            })
        })
        .collect();

    details.sort_by(|a, b| a.field.cmp(&b.field));
    details
}

/// Returns the keys of `body` that are not in `allowed`, sorted
///
/// An empty result means the update is acceptable.
///
/// ```
/// use serde_json::json;
/// use taskdesk_shared::validation::{disallowed_fields, TASK_UPDATE_FIELDS};
///
/// let body = json!({ "completed": true, "owner": "someone" });
/// let body = body.as_object().unwrap();
///
/// assert_eq!(disallowed_fields(body, TASK_UPDATE_FIELDS), vec!["owner".to_string()]);
/// ```
pub fn disallowed_fields(body: &Map<String, Value>, allowed: &[&str]) -> Vec<String> {
    let mut rejected: Vec<String> = body
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .cloned()
        .collect();

    rejected.sort();
    rejected
}

/// Returns the keys of `body` whose value is JSON `null`, sorted
///
/// Updates may omit a field but never clear one.
pub fn null_fields(body: &Map<String, Value>) -> Vec<FieldError> {
    let mut nulls: Vec<FieldError> = body
        .iter()
        .filter(|(_, value)| value.is_null())
        .map(|(key, _)| FieldError::new(key.as_str(), "Value cannot be null"))
        .collect();

    nulls.sort_by(|a, b| a.field.cmp(&b.field));
    nulls
}

/// Trims surrounding whitespace, the way names and descriptions are stored
pub fn normalize_text(value: &str) -> String {
    value.trim().to_string()
}

/// Trims and lower-cases an email address
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}
