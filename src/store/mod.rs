//!
//! # Storage layer
//!
//! Persistence sits behind two traits so the HTTP surface can run against
//! either the transactional Postgres store or an in-memory store during
//! tests. The ownership rule lives in the trait signatures: every task
//! operation takes the caller's `user_id` as a mandatory parameter, so a
//! cross-tenant read cannot be expressed at the call site.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskCreate, TaskPatch, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persists user records and enforces case-insensitive email uniqueness.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stores a new user under the normalized email. Fails with
    /// `DuplicateEmail` when the email is already taken, atomically with
    /// respect to concurrent creates (no check-then-insert).
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Looks a user up by email, normalizing the key the same way
    /// `create` does.
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Unrestricted enumeration, administrative/debug use only. Not
    /// exposed over HTTP.
    async fn list(&self) -> Result<Vec<User>, AppError>;
}

/// Persists tasks. Every operation is scoped to `user_id`; a task owned
/// by someone else behaves exactly like a task that does not exist.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a task owned by `user_id` from normalized, validated
    /// input.
    async fn create(&self, user_id: Uuid, input: TaskCreate) -> Result<Task, AppError>;

    async fn get_by_id(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<Task>, AppError>;

    /// All tasks owned by `user_id`, in insertion order.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Task>, AppError>;

    /// Applies the supplied fields to an owned task. `updated_at` is
    /// bumped only when a value actually changed. `None` when the task is
    /// absent or owned by someone else.
    async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError>;

    /// Removes an owned task; `false` under the same dual absent
    /// condition as `get_by_id`.
    async fn delete(&self, user_id: Uuid, task_id: Uuid) -> Result<bool, AppError>;
}
