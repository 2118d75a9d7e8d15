//! Shared state handed to every request handler.

use std::sync::Arc;

use osmanager::{AppConfig, Database, IngestPipeline};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub pipeline: Arc<IngestPipeline>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        let pipeline = IngestPipeline::from_config(db.clone(), &config);
        Self {
            db,
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
        }
    }

    /// Loads configuration from the environment and opens the store it names.
    pub fn from_env() -> osmanager::Result<Self> {
        let config = AppConfig::from_env()?;
        let db = Database::open(&config.database_path)?;
        Ok(Self::new(db, config))
    }
}
