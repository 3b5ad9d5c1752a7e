/// Request extractors with `ApiError` rejections
///
/// Axum's stock `Json` and `Query` reject with plain-text bodies and a mix
/// of 400/415/422 statuses. These wrappers route every rejection through
/// [`ApiError::BadRequest`] so malformed input always gets a JSON 400.

use crate::error::{ApiError, ApiResult};
use axum::extract::{FromRequest, FromRequestParts};
use taskdesk_shared::validation::{collect_errors, FieldError};
use uuid::Uuid;
use validator::Validate;

/// JSON body extractor
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string extractor
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// Parses a resource ID from a path segment
///
/// Anything that isn't a UUID cannot name an existing resource, so it is
/// reported as not found rather than as a bad request.
pub fn parse_id(raw: &str, resource: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(format!("{} not found", resource)))
}

/// Runs derived rules plus any extra checks, failing with every problem at once
pub fn validate_request<T: Validate>(
    request: &T,
    extra: impl IntoIterator<Item = FieldError>,
) -> ApiResult<()> {
    let mut errors = match request.validate() {
        Ok(()) => Vec::new(),
        Err(e) => collect_errors(&e),
    };
    errors.extend(extra);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string(), "Task").unwrap(), id);

        match parse_id("12345", "Task") {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Task not found"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_request_merges_extra_errors() {
        let request = Named {
            name: String::new(),
        };

        match validate_request(&request, [FieldError::new("password", "Too weak")]) {
            Err(ApiError::ValidationError(errors)) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["name", "password"]);
            }
            other => panic!("expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_request_ok() {
        let request = Named {
            name: "Mike".to_string(),
        };
        assert!(validate_request(&request, None).is_ok());
    }
}
