//! Registry of the spreadsheet fields ingestion knows how to fill.
//!
//! The resolver reads the candidate header phrases from here and the insert
//! path reads the storage column and coercion kind, so adding a field is a
//! single entry in [`FIELDS`].

/// How a cell is coerced before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Stored as the cell's text rendering.
    Text,
    /// Canonicalized through the status vocabulary.
    Status,
    /// Parsed as a currency amount.
    Amount,
    /// Parsed as a calendar date.
    Date,
}

/// A logical field: where it is stored and which headers may carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub column: &'static str,
    /// Upper-case header phrases, tried in order.
    pub candidates: &'static [&'static str],
    pub kind: FieldKind,
}

/// Resolution order matters: each field is resolved independently, so two
/// fields may claim the same header.
pub const FIELDS: [FieldSpec; 9] = [
    FieldSpec {
        column: "descricao_operacao",
        candidates: &["DESCR", "DESCRI", "OPERACAO"],
        kind: FieldKind::Text,
    },
    FieldSpec {
        column: "status_cotacao",
        candidates: &["STATUS COT", "STATUS_COT", "STATUSCOTACAO", "COTACAO STATUS"],
        kind: FieldKind::Text,
    },
    FieldSpec {
        column: "status",
        candidates: &["STATUS"],
        kind: FieldKind::Status,
    },
    FieldSpec {
        column: "denominacao_produto",
        candidates: &["PRODUTO", "DENOMINACAO PRODUTO"],
        kind: FieldKind::Text,
    },
    FieldSpec {
        column: "nome_emissor_ordem",
        candidates: &["CLIENTE", "NOME", "EMISSOR", "NOME EMISSOR"],
        kind: FieldKind::Text,
    },
    FieldSpec {
        column: "valor_pedido_bruto",
        candidates: &["VALOR", "TOTAL", "PRECO", "VALOR PEDIDO"],
        kind: FieldKind::Amount,
    },
    FieldSpec {
        column: "criado_em",
        candidates: &["CRIADO", "DATA", "DATA CRIACAO"],
        kind: FieldKind::Date,
    },
    FieldSpec {
        column: "numero_circuito",
        candidates: &["NUMERO CIRCUITO", "CIRCUITO"],
        kind: FieldKind::Text,
    },
    FieldSpec {
        column: "numero_cotacao",
        candidates: &["NUMERO COTACAO", "COTACAO"],
        kind: FieldKind::Text,
    },
];

/// Finds the registry entry for a storage column.
pub fn by_column(column: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.column == column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::COLUMNS;

    #[test]
    fn test_every_field_is_a_table_column() {
        for field in &FIELDS {
            assert!(COLUMNS.contains(&field.column), "{}", field.column);
        }
    }

    #[test]
    fn test_candidates_are_upper_case() {
        for field in &FIELDS {
            for candidate in field.candidates {
                assert_eq!(*candidate, candidate.to_uppercase());
            }
        }
    }

    #[test]
    fn test_by_column() {
        assert_eq!(by_column("status").map(|f| f.kind), Some(FieldKind::Status));
        assert_eq!(
            by_column("valor_pedido_bruto").map(|f| f.kind),
            Some(FieldKind::Amount)
        );
        assert!(by_column("quantidade").is_none());
    }
}
