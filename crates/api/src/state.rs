use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: basket_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Single-flight guard for statistics recomputation: at most one
    /// recompute runs at a time, a second trigger fails with 409.
    pub stats_refresh: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pool: basket_db::DbPool, config: ServerConfig) -> Self {
        AppState {
            pool,
            config: Arc::new(config),
            stats_refresh: Arc::new(Mutex::new(())),
        }
    }
}
