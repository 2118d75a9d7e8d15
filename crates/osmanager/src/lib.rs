pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod format;
pub mod ingest;
pub mod sanitize;

pub use config::{load_config, AppConfig};
pub use db::{Database, DatabaseError};
pub use error::{ConfigError, ExportError, OsManagerError, Result};
pub use export::ExportFile;
pub use format::format_brl;
pub use ingest::{IngestError, IngestPipeline, IngestReport};
