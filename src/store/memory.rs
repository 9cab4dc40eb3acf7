use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{normalize_email, Task, TaskCreate, TaskPatch, User};
use crate::store::{TaskStore, UserStore};

/// In-memory store for tests and local experiments.
///
/// Implements the same contracts as [`PgStore`](crate::store::PgStore):
/// normalized-email uniqueness, ownership scoping, insertion-order
/// listing, and the conditional `updated_at` bump. Vecs keep insertion
/// order; the single mutex stands in for the database's transactional
/// guarantees.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    tasks: Vec<Task>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory store mutex poisoned")
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let email = normalize_email(email);
        let mut inner = self.lock();

        if inner.users.iter().any(|u| u.email == email) {
            return Err(AppError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            email,
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = normalize_email(email);
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.lock().users.clone())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, user_id: Uuid, input: TaskCreate) -> Result<Task, AppError> {
        let task = Task::new(input, user_id);
        self.lock().tasks.push(task.clone());
        Ok(task)
    }

    async fn get_by_id(&self, user_id: Uuid, task_id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self
            .lock()
            .tasks
            .iter()
            .find(|t| t.id == task_id && t.owner_id == user_id)
            .cloned())
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<Task>, AppError> {
        Ok(self
            .lock()
            .tasks
            .iter()
            .filter(|t| t.owner_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Task>, AppError> {
        let mut inner = self.lock();
        let Some(task) = inner
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id && t.owner_id == user_id)
        else {
            return Ok(None);
        };

        if task.apply(patch) {
            task.updated_at = Utc::now();
        }
        Ok(Some(task.clone()))
    }

    async fn delete(&self, user_id: Uuid, task_id: Uuid) -> Result<bool, AppError> {
        let mut inner = self.lock();
        let before = inner.tasks.len();
        inner
            .tasks
            .retain(|t| !(t.id == task_id && t.owner_id == user_id));
        Ok(inner.tasks.len() < before)
    }
}
