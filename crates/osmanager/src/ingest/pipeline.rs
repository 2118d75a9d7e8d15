use std::path::{Path, PathBuf};

use tracing::{debug, info_span, warn};

use crate::config::AppConfig;
use crate::db::order_repo::{self, NewOrder};
use crate::db::Database;
use crate::sanitize;

use super::fields::FIELDS;
use super::normalize::coerce;
use super::resolver::{resolve, ColumnMap};
use super::workbook::{read_first_sheet, Cell, Sheet};
use super::IngestError;

/// Accepted upload extensions, lower case.
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

pub struct IngestConfig {
    pub upload_directory: PathBuf,
    pub max_upload_bytes: u64,
}

impl IngestConfig {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            upload_directory: config.upload_directory.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Outcome of a successful ingestion.
#[derive(Debug)]
pub struct IngestReport {
    pub inserted: usize,
    /// Rows removed before inserting (replace mode only).
    pub removed: usize,
    pub staged_path: PathBuf,
    pub columns: ColumnMap,
}

pub struct IngestPipeline {
    db: Database,
    config: IngestConfig,
}

impl IngestPipeline {
    pub fn new(db: Database, config: IngestConfig) -> Self {
        Self { db, config }
    }

    pub fn from_config(db: Database, config: &AppConfig) -> Self {
        Self::new(db, IngestConfig::from_config(config))
    }

    /// Ingests one uploaded spreadsheet.
    ///
    /// With `replace` set the table is emptied first. The clear and the
    /// inserts are separate steps: if inserting fails after the clear, the
    /// table stays empty.
    pub fn run(
        &self,
        filename: &str,
        bytes: &[u8],
        replace: bool,
    ) -> Result<IngestReport, IngestError> {
        let extension = self.validate(filename, bytes.len() as u64)?;

        let safe_name = staged_name(filename, &extension);
        let _span = info_span!("ingest", filename = %safe_name, replace).entered();

        let staged_path = self.stage(&safe_name, bytes)?;

        match self.process(&staged_path, replace) {
            Ok((inserted, removed, columns)) => {
                log::info!(
                    "Ingested {} rows from {} (replace={}, removed={})",
                    inserted,
                    sanitize::redact_path(&staged_path),
                    replace,
                    removed
                );
                Ok(IngestReport {
                    inserted,
                    removed,
                    staged_path,
                    columns,
                })
            }
            Err(e) => {
                warn!(error = %e, "ingestion failed, discarding staged file");
                discard(&staged_path);
                Err(e)
            }
        }
    }

    fn validate(&self, filename: &str, size: u64) -> Result<String, IngestError> {
        if filename.trim().is_empty() {
            return Err(IngestError::EmptyFilename);
        }
        let extension = sanitize::extension(filename)
            .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| IngestError::UnsupportedExtension {
                filename: filename.to_string(),
            })?;
        if size > self.config.max_upload_bytes {
            return Err(IngestError::TooLarge {
                size,
                max_bytes: self.config.max_upload_bytes,
            });
        }
        Ok(extension)
    }

    fn stage(&self, safe_name: &str, bytes: &[u8]) -> Result<PathBuf, IngestError> {
        let dir = &self.config.upload_directory;
        std::fs::create_dir_all(dir).map_err(|e| IngestError::Stage {
            path: dir.clone(),
            source: e,
        })?;
        let path = dir.join(safe_name);
        std::fs::write(&path, bytes).map_err(|e| IngestError::Stage {
            path: path.clone(),
            source: e,
        })?;
        Ok(path)
    }

    fn process(
        &self,
        path: &Path,
        replace: bool,
    ) -> Result<(usize, usize, ColumnMap), IngestError> {
        let sheet = {
            let _step = info_span!("parse_workbook").entered();
            read_first_sheet(path)?
        };

        let columns = resolve(&sheet.headers);
        debug!(resolved = columns.resolved_count(), mapping = %columns, "resolved columns");

        let rows = build_rows(&sheet, &columns);

        let _step = info_span!("insert_rows", rows = rows.len()).entered();
        let removed = if replace {
            order_repo::delete_all(&self.db)?
        } else {
            0
        };
        let inserted = order_repo::insert_all(&self.db, &rows)?;
        Ok((inserted, removed, columns))
    }
}

/// Normalizes every sheet row into an insertable order.
///
/// Each registry field gets a value; unmapped fields coerce from an empty cell.
pub fn build_rows(sheet: &Sheet, columns: &ColumnMap) -> Vec<NewOrder> {
    sheet
        .rows
        .iter()
        .map(|row| NewOrder {
            values: FIELDS
                .iter()
                .map(|field| {
                    let cell: Option<&Cell> = columns
                        .get(field.column)
                        .and_then(|b| row.get(b.index));
                    (field.column, coerce(field.kind, cell))
                })
                .collect(),
        })
        .collect()
}

/// Name the upload is stored under. Falls back to `upload.<ext>` when
/// sanitizing leaves nothing usable.
fn staged_name(filename: &str, extension: &str) -> String {
    let safe = sanitize::secure_filename(filename);
    if sanitize::extension(&safe).as_deref() == Some(extension) && safe.len() > extension.len() + 1
    {
        safe
    } else {
        format!("upload.{}", extension)
    }
}

fn discard(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(
                file = %sanitize::redact_path(path),
                error = %e,
                "failed to remove staged upload"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Value;
    use rust_xlsxwriter::Workbook;

    fn pipeline(dir: &Path) -> (IngestPipeline, Database) {
        let db = Database::open_in_memory().unwrap();
        let pipeline = IngestPipeline::new(
            db.clone(),
            IngestConfig {
                upload_directory: dir.join("uploads"),
                max_upload_bytes: 1024 * 1024,
            },
        );
        (pipeline, db)
    }

    fn workbook_bytes(headers: &[&str], rows: &[&[&str]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (c, h) in headers.iter().enumerate() {
            sheet.write_string(0, c as u16, *h).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                sheet.write_string(r as u32 + 1, c as u16, *v).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_rejects_empty_filename() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path());
        let err = pipeline.run("", b"x", true).unwrap_err();
        assert!(matches!(err, IngestError::EmptyFilename));
        assert!(!dir.path().join("uploads").exists());
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path());
        for name in ["orders.csv", "orders", "orders.xlsm"] {
            let err = pipeline.run(name, b"x", true).unwrap_err();
            assert!(matches!(err, IngestError::UnsupportedExtension { .. }), "{}", name);
        }
        assert!(!dir.path().join("uploads").exists());
    }

    #[test]
    fn test_rejects_oversized_upload() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(dir.path());
        let big = vec![0u8; 1024 * 1024 + 1];
        let err = pipeline.run("big.xlsx", &big, true).unwrap_err();
        assert!(matches!(err, IngestError::TooLarge { .. }));
    }

    #[test]
    fn test_ingest_normalizes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, db) = pipeline(dir.path());
        let bytes = workbook_bytes(
            &["Cliente", "Status", "Valor", "Criado em"],
            &[
                &["Acme", "concluido", "R$ 1.234,56", "25/12/2023"],
                &["Globex", "", "abc", "garbage"],
            ],
        );

        let report = pipeline.run("Pedidos Março.XLSX", &bytes, true).unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.removed, 0);
        assert!(report.staged_path.ends_with("Pedidos_Marco.XLSX"));
        assert!(report.staged_path.exists());

        let rows = order_repo::query(&db, &Default::default()).unwrap();
        let globex = &rows[0];
        assert_eq!(globex.nome_emissor_ordem.as_deref(), Some("Globex"));
        assert_eq!(globex.status.as_deref(), Some("Sem Status"));
        assert_eq!(globex.valor_pedido_bruto, None);
        assert_eq!(globex.criado_em, None);

        let acme = &rows[1];
        assert_eq!(acme.status.as_deref(), Some("Concluído"));
        assert_eq!(acme.valor_pedido_bruto, Some(1234.56));
        assert_eq!(acme.criado_em.as_deref(), Some("2023-12-25"));
        assert_eq!(acme.quantidade, None);
        assert_eq!(acme.numero_vta, None);
    }

    #[test]
    fn test_replace_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, db) = pipeline(dir.path());
        let first = workbook_bytes(&["Cliente"], &[&["a"], &["b"], &["c"]]);
        let second = workbook_bytes(&["Cliente"], &[&["x"], &["y"]]);

        pipeline.run("a.xlsx", &first, true).unwrap();
        let report = pipeline.run("b.xlsx", &second, true).unwrap();
        assert_eq!(report.removed, 3);
        assert_eq!(order_repo::count(&db).unwrap(), 2);

        pipeline.run("b.xlsx", &second, false).unwrap();
        assert_eq!(order_repo::count(&db).unwrap(), 4);
    }

    #[test]
    fn test_parse_failure_discards_staged_file_and_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, db) = pipeline(dir.path());
        let good = workbook_bytes(&["Cliente"], &[&["a"]]);
        pipeline.run("good.xlsx", &good, true).unwrap();

        let err = pipeline.run("bad.xlsx", b"not a workbook", true).unwrap_err();
        assert!(matches!(err, IngestError::Workbook { .. }));
        assert!(!dir.path().join("uploads").join("bad.xlsx").exists());
        assert!(dir.path().join("uploads").join("good.xlsx").exists());
        assert_eq!(order_repo::count(&db).unwrap(), 1);
    }

    #[test]
    fn test_build_rows_covers_every_field() {
        let sheet = Sheet {
            name: "s".to_string(),
            headers: vec!["Status".to_string()],
            rows: vec![vec![Cell::Text("pendente".to_string())], vec![]],
        };
        let columns = resolve(&sheet.headers);
        let rows = build_rows(&sheet, &columns);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].values.len(), FIELDS.len());
        assert_eq!(rows[0].get("status"), Some(&Value::Text("Pendente".to_string())));
        assert_eq!(rows[1].get("status"), Some(&Value::Text("Sem Status".to_string())));
        assert_eq!(rows[1].get("descricao_operacao"), Some(&Value::Null));
    }

    #[test]
    fn test_staged_name_fallback() {
        assert_eq!(staged_name("Relatório.xlsx", "xlsx"), "Relatorio.xlsx");
        assert_eq!(staged_name("日本.xlsx", "xlsx"), "upload.xlsx");
        assert_eq!(staged_name(".xls", "xls"), "upload.xls");
    }
}
