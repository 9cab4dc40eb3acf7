use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is yet to be completed.
    Pending,
    /// Task is done.
    Completed,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// A task entity as stored and as returned by the API.
///
/// `owner_id` is set once at creation and is part of every store lookup
/// key; a task is never reachable through an operation scoped to a
/// different user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input payload for creating a task.
///
/// Callers must run `normalize()` before `validate()`: the length limits
/// apply to the trimmed values.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskCreate {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters after trimming"))]
    pub title: String,

    #[validate(length(max = 400, message = "must be at most 400 characters after trimming"))]
    pub description: Option<String>,

    #[serde(default)]
    pub status: TaskStatus,

    #[validate(custom = "validate_due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskCreate {
    /// Trims `title` and `description`; a description that is empty after
    /// trimming becomes absent.
    pub fn normalize(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = self.description.and_then(|description| {
            let description = description.trim().to_string();
            if description.is_empty() {
                None
            } else {
                Some(description)
            }
        });
        self
    }
}

/// Partial-update payload: fields absent from the request body stay
/// untouched on the task. Supplied fields are re-validated with the same
/// rules as creation.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 120, message = "must be 1-120 characters after trimming"))]
    pub title: Option<String>,

    #[validate(length(max = 400, message = "must be at most 400 characters after trimming"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    #[validate(custom = "validate_due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    /// Trims supplied string fields. An all-whitespace title is kept as an
    /// empty string so validation rejects it; an all-whitespace description
    /// survives as `Some("")` and clears the field once turned into a patch.
    pub fn normalize(mut self) -> Self {
        self.title = self.title.map(|title| title.trim().to_string());
        self.description = self
            .description
            .map(|description| description.trim().to_string());
        self
    }

    /// Converts the validated payload into the patch applied by stores.
    pub fn into_patch(self) -> TaskPatch {
        TaskPatch {
            title: self.title,
            description: self.description.map(|description| {
                if description.is_empty() {
                    None
                } else {
                    Some(description)
                }
            }),
            status: self.status,
            due_date: self.due_date,
        }
    }
}

/// The set of changes a store applies to a task.
///
/// `description: Some(None)` clears the field; the outer `None` on any
/// member means "leave as is".
#[derive(Debug, Clone)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new `Task` owned by `owner_id` from normalized, validated
    /// input. `created_at` and `updated_at` start out equal.
    pub fn new(input: TaskCreate, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            title: input.title,
            description: input.description,
            status: input.status,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the supplied fields and reports whether any stored value
    /// actually changed. Does not touch `updated_at`; stores bump it only
    /// when this returns true, so a no-op update leaves the timestamp
    /// alone.
    pub fn apply(&mut self, patch: TaskPatch) -> bool {
        let mut changed = false;
        if let Some(title) = patch.title {
            if self.title != title {
                self.title = title;
                changed = true;
            }
        }
        if let Some(description) = patch.description {
            if self.description != description {
                self.description = description;
                changed = true;
            }
        }
        if let Some(status) = patch.status {
            if self.status != status {
                self.status = status;
                changed = true;
            }
        }
        if let Some(due_date) = patch.due_date {
            if self.due_date != Some(due_date) {
                self.due_date = Some(due_date);
                changed = true;
            }
        }
        changed
    }
}

fn validate_due_date(due_date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *due_date <= Utc::now() {
        let mut error = ValidationError::new("due_date_in_past");
        error.message = Some("must be strictly in the future".into());
        return Err(error);
    }
    Ok(())
}
