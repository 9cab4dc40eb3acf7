pub mod task;
pub mod user;

pub use task::{Task, TaskCreate, TaskPatch, TaskStatus, TaskUpdate};
pub use user::{normalize_email, PublicUser, User};
