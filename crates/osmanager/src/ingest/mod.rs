//! Spreadsheet ingestion: from uploaded bytes to stored order rows.

pub mod fields;
pub mod normalize;
pub mod pipeline;
pub mod resolver;
pub mod workbook;

use std::path::PathBuf;
use thiserror::Error;

use crate::db::DatabaseError;

pub use pipeline::{IngestConfig, IngestPipeline, IngestReport, ALLOWED_EXTENSIONS};
pub use resolver::{resolve, ColumnMap};
pub use workbook::{Cell, Sheet};

/// Errors from the ingestion pipeline.
///
/// The first group rejects the upload before anything is written. The rest
/// happen while processing and carry the underlying detail.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Arquivo sem nome")]
    EmptyFilename,

    #[error("Tipo de arquivo não suportado. Envie .xls ou .xlsx")]
    UnsupportedExtension { filename: String },

    #[error("Arquivo excede o tamanho máximo de {max_bytes} bytes")]
    TooLarge { size: u64, max_bytes: u64 },

    #[error("Failed to stage upload '{path}': {source}")]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read workbook: {message}")]
    Workbook { message: String },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl IngestError {
    /// True when the upload was refused before any file or row was touched.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            IngestError::EmptyFilename
                | IngestError::UnsupportedExtension { .. }
                | IngestError::TooLarge { .. }
        )
    }
}
