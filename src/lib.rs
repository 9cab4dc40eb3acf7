#![doc = "The `taskvault` library crate."]
#![doc = ""]
#![doc = "Multi-tenant task management: registration, login, bearer-token"]
#![doc = "authentication, and per-user task CRUD with strict ownership scoping."]
#![doc = "Persistence sits behind the `store` traits (Postgres in production,"]
#![doc = "in-memory for tests); the binary in `main.rs` wires the pieces into"]
#![doc = "an actix-web server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
