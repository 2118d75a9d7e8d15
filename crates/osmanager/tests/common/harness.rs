//! Test harness for isolated test execution.
//!
//! Each `TestHarness` owns a temporary directory holding the SQLite file and
//! the upload staging directory, so tests never share state.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use osmanager::db::order_repo::{self, NewOrder};
use osmanager::ingest::{IngestConfig, IngestError, IngestPipeline, IngestReport};
use osmanager::{AppConfig, Database};

pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub upload_dir: PathBuf,
    pub db: Database,
    pipeline: IngestPipeline,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("ordens_servico_completo.db");
        let upload_dir = temp_dir.path().join("uploads");

        let db = Database::open(&db_path).expect("Failed to open database");
        let pipeline = IngestPipeline::new(
            db.clone(),
            IngestConfig {
                upload_directory: upload_dir.clone(),
                max_upload_bytes: osmanager::config::DEFAULT_MAX_UPLOAD_BYTES,
            },
        );

        Self {
            temp_dir,
            db_path,
            upload_dir,
            db,
            pipeline,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Configuration pointing at this harness's directories.
    pub fn config(&self) -> AppConfig {
        AppConfig {
            database_path: self.db_path.clone(),
            upload_directory: self.upload_dir.clone(),
            ..AppConfig::default()
        }
    }

    /// Runs an upload through the ingestion pipeline.
    pub fn upload(
        &self,
        filename: &str,
        bytes: &[u8],
        replace: bool,
    ) -> Result<IngestReport, IngestError> {
        self.pipeline.run(filename, bytes, replace)
    }

    /// Inserts rows directly, bypassing ingestion.
    pub fn seed(&self, rows: Vec<NewOrder>) {
        order_repo::insert_all(&self.db, &rows).expect("Failed to seed orders");
    }

    pub fn count(&self) -> u64 {
        order_repo::count(&self.db).expect("Failed to count orders")
    }

    /// Names of the files currently staged in the upload directory.
    pub fn staged_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.upload_dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
