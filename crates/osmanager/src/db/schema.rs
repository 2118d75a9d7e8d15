//! Table definition for `ordens_servico`.
//!
//! The table is created on open when absent. There is no version tracking;
//! the shape below is the only shape the application knows.

use rusqlite::Connection;

use super::DatabaseError;

/// Name of the single orders table.
pub const TABLE: &str = "ordens_servico";

/// Every column in storage order.
pub const COLUMNS: [&str; 23] = [
    "id",
    "descricao_operacao",
    "numero_oportunidade",
    "numero_vta",
    "numero_cotacao",
    "numero_circuito",
    "status_cotacao",
    "denominacao_produto",
    "quantidade",
    "status",
    "valor_pedido_bruto",
    "criado_em",
    "emissor_ordem",
    "nome_emissor_ordem",
    "nome_gerente_contas",
    "organizacao_vendas",
    "canal_distribuicao",
    "setor_atividade",
    "item_sd",
    "id_produto",
    "tempo_contrato",
    "data_importacao",
    "data_atualizacao",
];

/// Columns a spreadsheet is expected to provide, as reported on the settings page.
pub const EXPECTED_COLUMNS: [&str; 9] = [
    "descricao_operacao",
    "numero_cotacao",
    "numero_circuito",
    "status_cotacao",
    "denominacao_produto",
    "valor_pedido_bruto",
    "criado_em",
    "nome_emissor_ordem",
    "status",
];

const CREATE_SQL: &str = "
CREATE TABLE IF NOT EXISTS ordens_servico (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    descricao_operacao TEXT,
    numero_oportunidade TEXT,
    numero_vta TEXT,
    numero_cotacao TEXT,
    numero_circuito TEXT,
    status_cotacao TEXT,
    denominacao_produto TEXT,
    quantidade INTEGER,
    status TEXT,
    valor_pedido_bruto REAL,
    criado_em DATE,
    emissor_ordem TEXT,
    nome_emissor_ordem TEXT,
    nome_gerente_contas TEXT,
    organizacao_vendas TEXT,
    canal_distribuicao TEXT,
    setor_atividade TEXT,
    item_sd TEXT,
    id_produto TEXT,
    tempo_contrato TEXT,
    data_importacao DATETIME DEFAULT CURRENT_TIMESTAMP,
    data_atualizacao DATETIME DEFAULT CURRENT_TIMESTAMP
);
";

/// Creates the orders table if it does not exist yet.
pub fn create(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(CREATE_SQL)?;
    Ok(())
}

/// Returns the column names of the orders table as SQLite reports them.
pub fn column_names(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare("PRAGMA table_info(ordens_servico)")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create(&conn).unwrap();
        create(&conn).unwrap();
    }

    #[test]
    fn test_column_names_match_storage_order() {
        let conn = Connection::open_in_memory().unwrap();
        create(&conn).unwrap();
        let names = column_names(&conn).unwrap();
        assert_eq!(names, COLUMNS.to_vec());
    }

    #[test]
    fn test_expected_columns_exist() {
        for column in EXPECTED_COLUMNS {
            assert!(COLUMNS.contains(&column), "missing {}", column);
        }
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let conn = Connection::open_in_memory().unwrap();
        create(&conn).unwrap();
        conn.execute("INSERT INTO ordens_servico (status) VALUES ('a')", [])
            .unwrap();
        conn.execute("DELETE FROM ordens_servico", []).unwrap();
        conn.execute("INSERT INTO ordens_servico (status) VALUES ('b')", [])
            .unwrap();
        let id: i64 = conn
            .query_row("SELECT id FROM ordens_servico", [], |r| r.get(0))
            .unwrap();
        assert_eq!(id, 2);
    }

    #[test]
    fn test_import_timestamps_default() {
        let conn = Connection::open_in_memory().unwrap();
        create(&conn).unwrap();
        conn.execute("INSERT INTO ordens_servico (status) VALUES ('a')", [])
            .unwrap();
        let (imported, updated): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT data_importacao, data_atualizacao FROM ordens_servico",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert!(imported.is_some());
        assert!(updated.is_some());
    }
}
