use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::AppConfig;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn max_page_size(&self) -> u64 {
        self.config.pagination.max_page_size
    }
}
