use sqlx::PgPool;
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::store::{MemoryStore, PgStore, TaskStore, UserStore};

/// Shared application state handed to every worker.
///
/// Handlers and the authentication middleware only see the store traits,
/// so the same router runs against Postgres in production and the
/// in-memory store in tests.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn postgres(pool: PgPool, auth: AuthConfig) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            users: store.clone(),
            tasks: store,
            auth,
        }
    }

    pub fn in_memory(auth: AuthConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            tasks: store,
            auth,
        }
    }
}
