use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{TaskCreate, TaskUpdate},
    state::AppState,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// List the caller's tasks, in insertion order.
///
/// The ownership filter is not optional: the store operation takes the
/// caller's id as part of its key, so other users' tasks are out of reach
/// by construction.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    log::info!("fetching tasks user_id={}", user.0.id);
    let tasks = state.tasks.list(user.0.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Create a task owned by the caller.
///
/// Field constraints are enforced here, before anything reaches storage:
/// title 1-120 chars after trimming, description up to 400 chars (blank
/// becomes absent), due date strictly in the future, status defaulting to
/// pending.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_data: web::Json<TaskCreate>,
) -> Result<impl Responder, AppError> {
    let task_data = task_data.into_inner().normalize();
    task_data.validate()?;

    let task = state.tasks.create(user.0.id, task_data).await?;
    log::info!("task created id={} user_id={}", task.id, user.0.id);

    Ok(HttpResponse::Created().json(task))
}

/// Fetch one of the caller's tasks by id.
///
/// A task that exists but belongs to someone else answers exactly like a
/// task that does not exist.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    match state.tasks.get_by_id(user.0.id, task_id).await? {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => {
            log::warn!("task not found id={} user_id={}", task_id, user.0.id);
            Err(AppError::NotFound("Task not found".into()))
        }
    }
}

/// Partially update one of the caller's tasks.
///
/// Only fields present in the body change; each supplied field is
/// re-validated with the creation rules. A no-op patch (values identical
/// to what is stored) succeeds without bumping `updated_at`.
#[patch("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let task_data = task_data.into_inner().normalize();
    task_data.validate()?;

    let task_id = task_id.into_inner();
    match state
        .tasks
        .update(user.0.id, task_id, task_data.into_patch())
        .await?
    {
        Some(task) => {
            log::info!("task updated id={} user_id={}", task_id, user.0.id);
            Ok(HttpResponse::Ok().json(task))
        }
        None => {
            log::warn!("task not found for update id={}", task_id);
            Err(AppError::NotFound("Task not found".into()))
        }
    }
}

/// Delete one of the caller's tasks.
///
/// Deleting an already-deleted (or never-owned) task is a 404 both times,
/// not an error and not a silent success.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    if state.tasks.delete(user.0.id, task_id).await? {
        log::info!("task deleted id={} user_id={}", task_id, user.0.id);
        Ok(HttpResponse::NoContent().finish())
    } else {
        log::warn!("task not found for delete id={}", task_id);
        Err(AppError::NotFound("Task not found".into()))
    }
}
