use std::sync::Arc;

use crate::config::ServerConfig;
use crate::storage::LocalStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted internally and the rest
/// sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mj_db::DbPool,
    /// Server configuration (JWT secret, upload limits, ...).
    pub config: Arc<ServerConfig>,
    /// On-disk store for uploaded photos.
    pub storage: Arc<LocalStorage>,
}

impl AppState {
    pub fn new(pool: mj_db::DbPool, config: ServerConfig) -> Self {
        let storage = Arc::new(LocalStorage::new(config.upload_dir.clone()));
        Self {
            pool,
            config: Arc::new(config),
            storage,
        }
    }
}
