/// Task endpoints
///
/// Every query is scoped to the authenticated owner. A task that exists but
/// belongs to someone else is indistinguishable from one that doesn't exist:
/// both yield 404.
///
/// # Endpoints
///
/// - `POST /tasks` - Create a task
/// - `GET /tasks` - List own tasks (`completed`, `limit`, `skip`, `sortBy`)
/// - `GET /tasks/:id` - Read one task
/// - `PATCH /tasks/:id` - Update `description` / `completed`
/// - `DELETE /tasks/:id` - Delete one task

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{parse_id, validate_request, JsonBody, QueryParams},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use taskdesk_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, Task, TaskQuery, TaskSort, UpdateTask},
    validation::{disallowed_fields, normalize_text, null_fields, TASK_UPDATE_FIELDS},
};
use uuid::Uuid;
use validator::Validate;

/// Largest page `GET /tasks` will return
pub const MAX_PAGE_SIZE: i64 = 100;

/// Wire view of a task
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            description: task.description,
            completed: task.completed,
            owner: task.owner_id,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

/// Create task request
///
/// Any `owner` in the body is ignored; the owner is always the caller.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: String,

    #[serde(default)]
    pub completed: bool,
}

/// Update task request, after key whitelisting
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 1000, message = "Description must be 1-1000 characters"))]
    pub description: Option<String>,

    pub completed: Option<bool>,
}

/// Raw `GET /tasks` query string
///
/// Kept as strings where the accepted spellings are narrower than serde's.
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksParams {
    pub completed: Option<String>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

impl TryFrom<ListTasksParams> for TaskQuery {
    type Error = ApiError;

    fn try_from(params: ListTasksParams) -> Result<Self, Self::Error> {
        let completed = match params.completed.as_deref() {
            None => None,
            Some("true") => Some(true),
            Some("false") => Some(false),
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "completed must be true or false, got '{}'",
                    other
                )))
            }
        };

        if let Some(limit) = params.limit {
            if !(1..=MAX_PAGE_SIZE).contains(&limit) {
                return Err(ApiError::BadRequest(format!(
                    "limit must be between 1 and {}",
                    MAX_PAGE_SIZE
                )));
            }
        }

        let skip = params.skip.unwrap_or(0);
        if skip < 0 {
            return Err(ApiError::BadRequest("skip must not be negative".to_string()));
        }

        let sort = match params.sort_by.as_deref() {
            None => TaskSort::default(),
            Some(raw) => raw.parse::<TaskSort>().map_err(ApiError::BadRequest)?,
        };

        Ok(TaskQuery {
            completed,
            sort,
            limit: params.limit,
            skip,
        })
    }
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

/// Create a task owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(req): JsonBody<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let req = CreateTaskRequest {
        description: normalize_text(&req.description),
        ..req
    };
    validate_request(&req, None)?;

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user.id,
            description: req.description,
            completed: req.completed,
        },
    )
    .await?;

    tracing::debug!(task_id = %task.id, owner_id = %auth.user.id, "Task created");

    Ok((StatusCode::CREATED, Json(task.into())))
}

/// List the caller's tasks
///
/// # Errors
///
/// - `400 Bad Request`: `completed` not true/false, `limit` outside
///   1..=100, negative `skip`, or unknown `sortBy`
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    QueryParams(params): QueryParams<ListTasksParams>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let query = TaskQuery::try_from(params)?;

    let tasks = Task::list_by_owner(&state.db, auth.user.id, &query).await?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Read one of the caller's tasks
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_id(&id, "Task")?;

    let task = Task::find_by_id_and_owner(&state.db, id, auth.user.id)
        .await?
        .ok_or_else(task_not_found)?;

    Ok(Json(task.into()))
}

/// Update one of the caller's tasks
///
/// # Errors
///
/// - `400 Bad Request`: a key other than `description` / `completed`
///   ("Invalid updates!"), or an invalid value
/// - `404 Not Found`: no such task for this owner
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_id(&id, "Task")?;

    if !disallowed_fields(&body, TASK_UPDATE_FIELDS).is_empty() {
        return Err(ApiError::BadRequest("Invalid updates!".to_string()));
    }

    let nulls = null_fields(&body);
    if !nulls.is_empty() {
        return Err(ApiError::ValidationError(nulls));
    }

    let req: UpdateTaskRequest = serde_json::from_value(Value::Object(body))?;
    let req = UpdateTaskRequest {
        description: req.description.as_deref().map(normalize_text),
        ..req
    };
    validate_request(&req, None)?;

    let task = Task::update_for_owner(
        &state.db,
        id,
        auth.user.id,
        UpdateTask {
            description: req.description,
            completed: req.completed,
        },
    )
    .await?
    .ok_or_else(task_not_found)?;

    Ok(Json(task.into()))
}

/// Delete one of the caller's tasks, returning it
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let id = parse_id(&id, "Task")?;

    let task = Task::delete_for_owner(&state.db, id, auth.user.id)
        .await?
        .ok_or_else(task_not_found)?;

    tracing::debug!(task_id = %task.id, "Task deleted");

    Ok(Json(task.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdesk_shared::models::task::{SortDirection, SortField};

    fn params(completed: Option<&str>, limit: Option<i64>, skip: Option<i64>, sort_by: Option<&str>) -> ListTasksParams {
        ListTasksParams {
            completed: completed.map(str::to_string),
            limit,
            skip,
            sort_by: sort_by.map(str::to_string),
        }
    }

    #[test]
    fn test_query_defaults() {
        let query = TaskQuery::try_from(ListTasksParams::default()).unwrap();
        assert_eq!(query, TaskQuery::default());
    }

    #[test]
    fn test_query_full() {
        let query =
            TaskQuery::try_from(params(Some("false"), Some(10), Some(20), Some("updatedAt:desc")))
                .unwrap();

        assert_eq!(query.completed, Some(false));
        assert_eq!(query.limit, Some(10));
        assert_eq!(query.skip, 20);
        assert_eq!(query.sort.field, SortField::UpdatedAt);
        assert_eq!(query.sort.direction, SortDirection::Desc);
    }

    #[test]
    fn test_query_rejects_bad_values() {
        for bad in [
            params(Some("yes"), None, None, None),
            params(Some("TRUE"), None, None, None),
            params(None, Some(0), None, None),
            params(None, Some(101), None, None),
            params(None, None, Some(-1), None),
            params(None, None, None, Some("owner:asc")),
            params(None, None, None, Some("createdAt:sideways")),
        ] {
            let label = format!("{:?}", bad);
            assert!(
                matches!(TaskQuery::try_from(bad), Err(ApiError::BadRequest(_))),
                "{} should be rejected",
                label
            );
        }
    }

    #[test]
    fn test_task_response_wire_format() {
        let owner = Uuid::new_v4();
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: owner,
            description: "First task".to_string(),
            completed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(TaskResponse::from(task)).unwrap();
        assert_eq!(value["owner"], owner.to_string());
        assert_eq!(value["description"], "First task");
        assert!(value.get("_id").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("owner_id").is_none());
    }

    #[test]
    fn test_blank_description_fails_validation() {
        let req = CreateTaskRequest {
            description: normalize_text("   "),
            completed: false,
        };
        assert!(validate_request(&req, None).is_err());
    }
}
