//! Aggregate queries over the orders table.
//!
//! Every function is a read-only full scan; nothing is cached between calls.

use serde::Serialize;

use super::{schema, Database, DatabaseError};

/// Label used when an order has no status.
pub const NO_STATUS: &str = "Sem Status";
/// Label used when an order has no quotation status.
pub const NO_QUOTATION: &str = "Sem Cotação";
/// Label used when an order has no issuer name.
pub const NO_CLIENT: &str = "Sem Nome";
/// Label used when an order has no product.
pub const NO_PRODUCT: &str = "Sem Produto";

/// Statuses counted as pending, alongside NULL.
pub const PENDING_STATUSES: [&str; 3] = ["Pendente", "Aberto", "Em Andamento"];

const TOP_LIMIT: u32 = 10;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub total: u64,
    pub concluidas: u64,
    pub pendentes: u64,
    pub valor_total: f64,
    /// Date part of the most recent import timestamp.
    pub ultima_atualizacao: Option<String>,
}

/// A label and how many orders fall under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

/// A label and the summed order amount under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelTotal {
    pub label: String,
    pub total: f64,
}

/// One cell of the status by quotation-status matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceRow {
    pub status: String,
    pub status_cotacao: String,
    pub quantidade: u64,
    pub total: f64,
    pub media: f64,
}

/// Totals shown on the reports page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetrics {
    pub total: u64,
    pub valor_total: f64,
    pub ticket_medio: f64,
}

/// What the settings page reports about the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageInfo {
    pub total_registros: u64,
    pub tamanho_mb: f64,
    pub colunas_esperadas: Vec<String>,
    /// Actual column names, empty while the table has no rows.
    pub colunas: Vec<String>,
}

/// Returns the dashboard headline numbers.
pub fn metrics(db: &Database) -> Result<DashboardMetrics, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'Concluído' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status IS NULL OR status IN ('{}', '{}', '{}') THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(valor_pedido_bruto), 0.0),
                    MAX(data_importacao)
             FROM ordens_servico",
            PENDING_STATUSES[0], PENDING_STATUSES[1], PENDING_STATUSES[2]
        );
        let (total, concluidas, pendentes, valor_total, last_import): (
            u64,
            u64,
            u64,
            f64,
            Option<String>,
        ) = conn.query_row(&sql, [], |row| {
            Ok((
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
            ))
        })?;

        Ok(DashboardMetrics {
            total,
            concluidas,
            pendentes,
            valor_total,
            ultima_atualizacao: last_import.map(|ts| ts.chars().take(10).collect()),
        })
    })
}

fn label_counts(db: &Database, sql: &str) -> Result<Vec<LabelCount>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(LabelCount {
                    label: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Order count per status, most frequent first.
pub fn status_histogram(db: &Database) -> Result<Vec<LabelCount>, DatabaseError> {
    label_counts(
        db,
        &format!(
            "SELECT IFNULL(status, '{NO_STATUS}') AS label, COUNT(*) AS n
             FROM ordens_servico GROUP BY label ORDER BY n DESC, label"
        ),
    )
}

/// Summed amount per quotation status, largest first, top ten.
pub fn quotation_totals(db: &Database) -> Result<Vec<LabelTotal>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!(
            "SELECT IFNULL(status_cotacao, '{NO_QUOTATION}') AS label,
                    SUM(IFNULL(valor_pedido_bruto, 0.0)) AS total
             FROM ordens_servico GROUP BY label ORDER BY total DESC, label LIMIT {TOP_LIMIT}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(LabelTotal {
                    label: row.get(0)?,
                    total: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Order count per creation month (`YYYY-MM`), oldest first.
pub fn monthly_timeline(db: &Database) -> Result<Vec<LabelCount>, DatabaseError> {
    label_counts(
        db,
        "SELECT strftime('%Y-%m', criado_em) AS label, COUNT(*)
         FROM ordens_servico WHERE criado_em IS NOT NULL
         GROUP BY label HAVING label IS NOT NULL ORDER BY label",
    )
}

/// The ten issuers with the most orders.
pub fn top_clients(db: &Database) -> Result<Vec<LabelCount>, DatabaseError> {
    label_counts(
        db,
        &format!(
            "SELECT IFNULL(nome_emissor_ordem, '{NO_CLIENT}') AS label, COUNT(*) AS n
             FROM ordens_servico GROUP BY label ORDER BY n DESC, label LIMIT {TOP_LIMIT}"
        ),
    )
}

/// The ten products with the most orders.
pub fn top_products(db: &Database) -> Result<Vec<LabelCount>, DatabaseError> {
    label_counts(
        db,
        &format!(
            "SELECT IFNULL(denominacao_produto, '{NO_PRODUCT}') AS label, COUNT(*) AS n
             FROM ordens_servico GROUP BY label ORDER BY n DESC, label LIMIT {TOP_LIMIT}"
        ),
    )
}

/// Count, sum and mean amount per (status, quotation status) pair.
///
/// The mean only considers rows with an amount; pairs without any amount report 0.
pub fn performance(db: &Database) -> Result<Vec<PerformanceRow>, DatabaseError> {
    db.with_conn(|conn| {
        let sql = format!(
            "SELECT IFNULL(status, '{NO_STATUS}') AS s,
                    IFNULL(status_cotacao, '{NO_QUOTATION}') AS c,
                    COUNT(*),
                    COALESCE(SUM(valor_pedido_bruto), 0.0),
                    COALESCE(AVG(valor_pedido_bruto), 0.0)
             FROM ordens_servico GROUP BY s, c ORDER BY s, c"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PerformanceRow {
                    status: row.get(0)?,
                    status_cotacao: row.get(1)?,
                    quantidade: row.get(2)?,
                    total: row.get(3)?,
                    media: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })
}

/// Row count, amount sum and mean amount over rows that have one.
pub fn report_metrics(db: &Database) -> Result<ReportMetrics, DatabaseError> {
    db.with_conn(|conn| {
        let metrics = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(valor_pedido_bruto), 0.0),
                    COALESCE(AVG(valor_pedido_bruto), 0.0)
             FROM ordens_servico",
            [],
            |row| {
                Ok(ReportMetrics {
                    total: row.get(0)?,
                    valor_total: row.get(1)?,
                    ticket_medio: row.get(2)?,
                })
            },
        )?;
        Ok(metrics)
    })
}

/// Row count, file size and column layout of the store.
///
/// An unreadable file reports a size of 0.
pub fn storage_info(db: &Database) -> Result<StorageInfo, DatabaseError> {
    let tamanho_mb = match db.file_size() {
        Ok(bytes) => (bytes as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0,
        Err(e) => {
            log::warn!("Could not read database size: {}", e);
            0.0
        }
    };

    db.with_conn(|conn| {
        let total_registros: u64 =
            conn.query_row("SELECT COUNT(*) FROM ordens_servico", [], |r| r.get(0))?;
        let colunas = if total_registros > 0 {
            schema::column_names(conn)?
        } else {
            Vec::new()
        };

        Ok(StorageInfo {
            total_registros,
            tamanho_mb,
            colunas_esperadas: schema::EXPECTED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            colunas,
        })
    })
}
