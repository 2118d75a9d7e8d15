//! Data-driven filter tests.
//!
//! Adding a case is one entry in `TEST_CASES`: the filter to apply and the
//! issuer names expected back, newest first.

mod common;

use common::{OrderBuilder, TestHarness};
use osmanager::db::order_repo::{self, OrderFilter};
use osmanager::export;

struct TestCase {
    name: &'static str,
    busca: &'static str,
    status: &'static str,
    status_cotacao: &'static str,
    expected: &'static [&'static str],
}

const TEST_CASES: &[TestCase] = &[
    TestCase {
        name: "no_filter_returns_all_newest_first",
        busca: "",
        status: "",
        status_cotacao: "",
        expected: &["Soylent", "Initech", "Globex", "Acme Norte", "Acme Sul"],
    },
    TestCase {
        name: "busca_is_case_insensitive_substring",
        busca: "acme",
        status: "",
        status_cotacao: "",
        expected: &["Acme Norte", "Acme Sul"],
    },
    TestCase {
        name: "busca_matches_description",
        busca: "fibra",
        status: "",
        status_cotacao: "",
        expected: &["Initech"],
    },
    TestCase {
        name: "busca_and_status_combine",
        busca: "Acme",
        status: "Pendente",
        status_cotacao: "",
        expected: &["Acme Sul"],
    },
    TestCase {
        name: "status_is_exact",
        busca: "",
        status: "pendente",
        status_cotacao: "",
        expected: &[],
    },
    TestCase {
        name: "status_cotacao_filter",
        busca: "",
        status: "",
        status_cotacao: "Rejeitada",
        expected: &["Soylent", "Globex"],
    },
    TestCase {
        name: "whitespace_filters_are_ignored",
        busca: "   ",
        status: " ",
        status_cotacao: "",
        expected: &["Soylent", "Initech", "Globex", "Acme Norte", "Acme Sul"],
    },
    TestCase {
        name: "surrounding_whitespace_is_trimmed",
        busca: "  Globex ",
        status: "",
        status_cotacao: "",
        expected: &["Globex"],
    },
];

fn seeded() -> TestHarness {
    let harness = TestHarness::new();
    harness.seed(vec![
        OrderBuilder::new()
            .cliente("Acme Sul")
            .descricao("Ativação")
            .status("Pendente")
            .status_cotacao("Aprovada")
            .build(),
        OrderBuilder::new()
            .cliente("Acme Norte")
            .descricao("Upgrade")
            .status("Concluído")
            .status_cotacao("Aprovada")
            .build(),
        OrderBuilder::new()
            .cliente("Globex")
            .descricao("Mudança de endereço")
            .status("Pendente")
            .status_cotacao("Rejeitada")
            .build(),
        OrderBuilder::new()
            .cliente("Initech")
            .descricao("Instalação FIBRA")
            .status("Aberto")
            .build(),
        OrderBuilder::new()
            .cliente("Soylent")
            .status("Cancelado")
            .status_cotacao("Rejeitada")
            .build(),
    ]);
    harness
}

fn filter_for(case: &TestCase) -> OrderFilter {
    OrderFilter {
        busca: Some(case.busca.to_string()),
        status: Some(case.status.to_string()),
        status_cotacao: Some(case.status_cotacao.to_string()),
        limit: None,
    }
}

#[test]
fn test_filter_cases() {
    let harness = seeded();
    for case in TEST_CASES {
        let rows = order_repo::query(&harness.db, &filter_for(case)).unwrap();
        let names: Vec<&str> = rows
            .iter()
            .filter_map(|r| r.nome_emissor_ordem.as_deref())
            .collect();
        assert_eq!(names, case.expected, "case '{}'", case.name);
    }
}

#[test]
fn test_export_count_matches_uncapped_query() {
    let harness = seeded();
    for case in TEST_CASES {
        let filter = filter_for(case);
        let file = export::export(&harness.db, &filter.with_limit(Some(1))).unwrap();
        let expected = order_repo::query(&harness.db, &filter).unwrap().len();
        assert_eq!(file.rows, expected, "case '{}'", case.name);
    }
}

#[test]
fn test_listing_cap() {
    let harness = TestHarness::new();
    harness.seed(
        (0..25)
            .map(|i| OrderBuilder::new().cliente(&format!("c{}", i)).build())
            .collect(),
    );
    let rows = order_repo::query(
        &harness.db,
        &OrderFilter {
            limit: Some(10),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0].nome_emissor_ordem.as_deref(), Some("c24"));
}
