use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{normalize_email, Task, TaskCreate, TaskPatch, User};
use crate::store::{TaskStore, UserStore};

/// Production store backed by Postgres.
///
/// Email uniqueness is the `users.email` unique constraint, not an
/// application-level check. Each logical operation runs as a single
/// statement or a single transaction.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .map_or(false, |db| db.is_unique_violation())
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEmail
            } else {
                AppError::from(e)
            }
        })
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = normalize_email(email);
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}

const TASK_COLUMNS: &str =
    "id, owner_id, title, description, status, due_date, created_at, updated_at";

#[async_trait]
impl TaskStore for PgStore {
    async fn create(&self, user_id: Uuid, input: TaskCreate) -> Result<Task, AppError> {
        let task = Task::new(input, user_id);
        let created = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks ({})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            TASK_COLUMNS, TASK_COLUMNS
        ))
        .bind(task.id)
        .bind(task.owner_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.due_date)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn get_by_id(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        ))
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE owner_id = $1 ORDER BY created_at, id",
            TASK_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tasks)
    }

    async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        // Read-modify-write in one transaction; the row lock keeps
        // concurrent patches from interleaving.
        let mut tx = self.pool.begin().await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2 FOR UPDATE",
            TASK_COLUMNS
        ))
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut task) = task else {
            tx.rollback().await?;
            return Ok(None);
        };

        if task.apply(patch) {
            task.updated_at = Utc::now();
            sqlx::query(
                "UPDATE tasks
                 SET title = $1, description = $2, status = $3, due_date = $4, updated_at = $5
                 WHERE id = $6 AND owner_id = $7",
            )
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status)
            .bind(task.due_date)
            .bind(task.updated_at)
            .bind(task.id)
            .bind(task.owner_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(task))
    }

    async fn delete(&self, user_id: Uuid, task_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
