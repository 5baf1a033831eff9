use sqlx::PgPool;

use crate::config::Config;
use crate::store::PgStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

impl AppState {
    /// Repository ports backed by the shared pool.
    pub fn store(&self) -> PgStore {
        PgStore::new(self.db.clone())
    }
}
