/// Task model and database operations
///
/// Tasks are personal to-do items. Every query that takes an owner ID is
/// scoped `WHERE owner_id = ...`, so another user's task behaves exactly
/// like a missing one.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     description TEXT NOT NULL,
///     completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskdesk_shared::models::task::{CreateTask, Task, TaskQuery};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// Task::create(&pool, CreateTask {
///     owner_id,
///     description: "First task".to_string(),
///     completed: false,
/// }).await?;
///
/// let open = Task::list_by_owner(&pool, owner_id, &TaskQuery {
///     completed: Some(false),
///     ..Default::default()
/// }).await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Task model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// User who owns the task
    pub owner_id: Uuid,

    /// What needs doing (non-empty, trimmed)
    pub description: String,

    /// Whether the task is done
    pub completed: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Owner ID
    pub owner_id: Uuid,

    /// Description
    pub description: String,

    /// Initial completion state
    #[serde(default)]
    pub completed: bool,
}

/// Input for updating a task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New description
    pub description: Option<String>,

    /// New completion state
    pub completed: Option<bool>,
}

/// Columns a task list can be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Description,
    Completed,
}

impl SortField {
    fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Description => "description",
            SortField::Completed => "completed",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Ordering of a task list, parsed from `field:direction`
///
/// Field names use the JSON spelling (`createdAt`, `updatedAt`,
/// `description`, `completed`); direction is `asc` or `desc` and defaults
/// to `asc` when omitted.
///
/// ```
/// use taskdesk_shared::models::task::{SortDirection, SortField, TaskSort};
///
/// let sort: TaskSort = "createdAt:desc".parse().unwrap();
/// assert_eq!(sort.field, SortField::CreatedAt);
/// assert_eq!(sort.direction, SortDirection::Desc);
///
/// assert!("owner:asc".parse::<TaskSort>().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl FromStr for TaskSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(':') {
            Some((field, direction)) => (field, Some(direction)),
            None => (s, None),
        };

        let field = match field {
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "description" => SortField::Description,
            "completed" => SortField::Completed,
            other => return Err(format!("Cannot sort by '{}'", other)),
        };

        let direction = match direction.map(|d| d.to_ascii_lowercase()).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => return Err(format!("Invalid sort direction '{}'", other)),
        };

        Ok(Self { field, direction })
    }
}

impl fmt::Display for TaskSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.field {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Description => "description",
            SortField::Completed => "completed",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{}:{}", field, direction)
    }
}

/// Filter, ordering and page selection for [`Task::list_by_owner`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Only tasks with this completion state (None = all)
    pub completed: Option<bool>,

    /// Ordering
    pub sort: TaskSort,

    /// Maximum number of tasks (None = unlimited)
    pub limit: Option<i64>,

    /// Number of tasks to skip
    pub skip: i64,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, description, completed)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, description, completed, created_at, updated_at
            "#,
        )
        .bind(data.owner_id)
        .bind(data.description)
        .bind(data.completed)
        .fetch_one(pool)
        .await?;

        tracing::debug!(task_id = %task.id, owner_id = %task.owner_id, "Task created");
        Ok(task)
    }

    /// Finds a task by ID regardless of owner
    ///
    /// Not for request handlers; use [`Task::find_by_id_and_owner`].
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, description, completed, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID with owner isolation
    pub async fn find_by_id_and_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, description, completed, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists an owner's tasks
    ///
    /// The ORDER BY clause is built from [`TaskSort`]'s closed set of
    /// columns; `id` breaks ties so pages are stable.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
        query: &TaskQuery,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT id, owner_id, description, completed, created_at, updated_at
            FROM tasks
            WHERE owner_id = $1 AND ($2::BOOLEAN IS NULL OR completed = $2)
            ORDER BY {} {}, id ASC
            LIMIT $3 OFFSET $4
            "#,
            query.sort.field.column(),
            query.sort.direction.keyword(),
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .bind(query.completed)
            .bind(query.limit)
            .bind(query.skip)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Counts an owner's tasks, optionally by completion state
    pub async fn count_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
        completed: Option<bool>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM tasks
            WHERE owner_id = $1 AND ($2::BOOLEAN IS NULL OR completed = $2)
            "#,
        )
        .bind(owner_id)
        .bind(completed)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Updates a task the owner holds
    ///
    /// # Returns
    ///
    /// The updated task, or None if no task with that ID belongs to
    /// `owner_id` (the row is left untouched).
    pub async fn update_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET description = COALESCE($3, description),
                completed = COALESCE($4, completed),
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, description, completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(data.description)
        .bind(data.completed)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task the owner holds
    ///
    /// # Returns
    ///
    /// The deleted task, or None if no task with that ID belongs to
    /// `owner_id`
    pub async fn delete_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, description, completed, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }
}
