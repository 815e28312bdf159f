use std::sync::Arc;

use catalog_core::installer::{InstallerValidator, ScriptValidator};

use crate::config::ServerConfig;
use crate::media::MediaStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: catalog_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Moves staged uploads into their final media location.
    pub media: Arc<MediaStore>,
    /// Structural validator for installer scripts.
    pub validator: Arc<dyn InstallerValidator + Send + Sync>,
}

impl AppState {
    /// Build state with the default script validator and a media store
    /// rooted at `config.media_root`.
    pub fn new(pool: catalog_db::DbPool, config: ServerConfig) -> Self {
        let media = Arc::new(MediaStore::new(config.media_root.clone()));
        Self {
            pool,
            config: Arc::new(config),
            media,
            validator: Arc::new(ScriptValidator),
        }
    }
}
