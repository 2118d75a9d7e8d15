//! Order repository: reads and writes for the `ordens_servico` table.
//!
//! Rows are only ever inserted in bulk by ingestion and removed in bulk by a
//! clear; nothing here updates an existing row.

use rusqlite::types::{ToSql, Value};
use rusqlite::{params_from_iter, Row};
use serde::Serialize;

use super::{Database, DatabaseError};

/// A stored order row, serialized with its storage column names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderRecord {
    pub id: i64,
    pub descricao_operacao: Option<String>,
    pub numero_oportunidade: Option<String>,
    pub numero_vta: Option<String>,
    pub numero_cotacao: Option<String>,
    pub numero_circuito: Option<String>,
    pub status_cotacao: Option<String>,
    pub denominacao_produto: Option<String>,
    pub quantidade: Option<i64>,
    pub status: Option<String>,
    pub valor_pedido_bruto: Option<f64>,
    pub criado_em: Option<String>,
    pub emissor_ordem: Option<String>,
    pub nome_emissor_ordem: Option<String>,
    pub nome_gerente_contas: Option<String>,
    pub organizacao_vendas: Option<String>,
    pub canal_distribuicao: Option<String>,
    pub setor_atividade: Option<String>,
    pub item_sd: Option<String>,
    pub id_produto: Option<String>,
    pub tempo_contrato: Option<String>,
    pub data_importacao: Option<String>,
    pub data_atualizacao: Option<String>,
}

impl OrderRecord {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get("id")?,
            descricao_operacao: row.get("descricao_operacao")?,
            numero_oportunidade: row.get("numero_oportunidade")?,
            numero_vta: row.get("numero_vta")?,
            numero_cotacao: row.get("numero_cotacao")?,
            numero_circuito: row.get("numero_circuito")?,
            status_cotacao: row.get("status_cotacao")?,
            denominacao_produto: row.get("denominacao_produto")?,
            quantidade: row.get("quantidade")?,
            status: row.get("status")?,
            valor_pedido_bruto: row.get("valor_pedido_bruto")?,
            criado_em: row.get("criado_em")?,
            emissor_ordem: row.get("emissor_ordem")?,
            nome_emissor_ordem: row.get("nome_emissor_ordem")?,
            nome_gerente_contas: row.get("nome_gerente_contas")?,
            organizacao_vendas: row.get("organizacao_vendas")?,
            canal_distribuicao: row.get("canal_distribuicao")?,
            setor_atividade: row.get("setor_atividade")?,
            item_sd: row.get("item_sd")?,
            id_produto: row.get("id_produto")?,
            tempo_contrato: row.get("tempo_contrato")?,
            data_importacao: row.get("data_importacao")?,
            data_atualizacao: row.get("data_atualizacao")?,
        })
    }
}

/// A row ready to insert: storage column names paired with values.
///
/// Columns left out fall back to NULL or their table default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewOrder {
    pub values: Vec<(&'static str, Value)>,
}

impl NewOrder {
    /// Looks up the value bound to `column`, if any.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }
}

/// Filter parameters shared by the listing and the export.
///
/// Blank values are ignored; the rest are trimmed before use.
#[derive(Debug, Default, Clone)]
pub struct OrderFilter {
    pub busca: Option<String>,
    pub status: Option<String>,
    pub status_cotacao: Option<String>,
    pub limit: Option<u64>,
}

impl OrderFilter {
    /// Returns a copy of this filter with the given row cap.
    pub fn with_limit(&self, limit: Option<u64>) -> Self {
        Self {
            limit,
            ..self.clone()
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Inserts every row inside a single transaction and returns how many were written.
///
/// A failure rolls back the rows of this call only; callers that cleared the
/// table beforehand are left with an empty table.
pub fn insert_all(db: &Database, rows: &[NewOrder]) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let tx = conn.unchecked_transaction()?;
        let mut inserted = 0;
        for row in rows {
            if row.values.is_empty() {
                tx.execute("INSERT INTO ordens_servico DEFAULT VALUES", [])?;
            } else {
                let columns: Vec<&str> = row.values.iter().map(|(c, _)| *c).collect();
                let placeholders: Vec<String> =
                    (1..=columns.len()).map(|i| format!("?{}", i)).collect();
                let sql = format!(
                    "INSERT INTO ordens_servico ({}) VALUES ({})",
                    columns.join(", "),
                    placeholders.join(", ")
                );
                let mut stmt = tx.prepare_cached(&sql)?;
                stmt.execute(params_from_iter(row.values.iter().map(|(_, v)| v)))?;
            }
            inserted += 1;
        }
        tx.commit()?;
        Ok(inserted)
    })
}

/// Deletes every row and returns how many were removed.
pub fn delete_all(db: &Database) -> Result<usize, DatabaseError> {
    db.with_conn(|conn| {
        let removed = conn.execute("DELETE FROM ordens_servico", [])?;
        Ok(removed)
    })
}

/// Counts all rows.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM ordens_servico", [], |r| r.get(0))?;
        Ok(count)
    })
}

/// Queries rows matching the filter, newest first.
pub fn query(db: &Database, filter: &OrderFilter) -> Result<Vec<OrderRecord>, DatabaseError> {
    db.with_conn(|conn| {
        let mut conditions = Vec::new();
        let mut param_values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(busca) = present(&filter.busca) {
            let idx = param_values.len() + 1;
            conditions.push(format!(
                "(nome_emissor_ordem LIKE ?{idx} OR descricao_operacao LIKE ?{idx})"
            ));
            param_values.push(Box::new(format!("%{}%", busca)));
        }
        if let Some(status) = present(&filter.status) {
            conditions.push(format!("status = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status.to_string()));
        }
        if let Some(status_cotacao) = present(&filter.status_cotacao) {
            conditions.push(format!("status_cotacao = ?{}", param_values.len() + 1));
            param_values.push(Box::new(status_cotacao.to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let mut sql = format!("SELECT * FROM ordens_servico {} ORDER BY id DESC", where_clause);
        if let Some(limit) = filter.limit {
            param_values.push(Box::new(limit as i64));
            sql.push_str(&format!(" LIMIT ?{}", param_values.len()));
        }

        let params_ref: Vec<&dyn ToSql> = param_values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows: Vec<OrderRecord> = stmt
            .query_map(params_ref.as_slice(), OrderRecord::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    })
}

/// Columns offered as filter dropdowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterColumn {
    Status,
    StatusCotacao,
}

impl FilterColumn {
    fn column(self) -> &'static str {
        match self {
            FilterColumn::Status => "status",
            FilterColumn::StatusCotacao => "status_cotacao",
        }
    }
}

/// Distinct non-empty values of a filter column, ascending.
pub fn distinct_values(db: &Database, column: FilterColumn) -> Result<Vec<String>, DatabaseError> {
    db.with_conn(|conn| {
        let column = column.column();
        let sql = format!(
            "SELECT DISTINCT {column} FROM ordens_servico
             WHERE {column} IS NOT NULL AND {column} != '' ORDER BY {column}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(values)
    })
}
