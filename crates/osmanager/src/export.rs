//! Spreadsheet export of filtered orders.

use chrono::{Local, NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook};

use crate::db::order_repo::{self, OrderFilter, OrderRecord};
use crate::db::{schema, Database};
use crate::error::ExportError;
use crate::ingest::normalize::parse_date_text;

pub const SHEET_NAME: &str = "Dados Filtrados";
pub const EMPTY_HEADER: &str = "Mensagem";
pub const EMPTY_MESSAGE: &str = "Nenhum registro encontrado com os filtros aplicados.";
pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const AMOUNT_COLUMN: &str = "valor_pedido_bruto";
const AMOUNT_HEADER: &str = "valor_pedido_bruto (R$)";

/// A rendered export ready to download.
#[derive(Debug)]
pub struct ExportFile {
    pub filename: String,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

enum Out {
    Text(String),
    Number(f64),
}

/// Exports every order matching the filter, ignoring any row cap on it.
pub fn export(db: &Database, filter: &OrderFilter) -> Result<ExportFile, ExportError> {
    let records = order_repo::query(db, &filter.with_limit(None))?;
    let bytes = render(&records)?;
    log::info!("Exported {} orders", records.len());
    Ok(ExportFile {
        filename: export_filename(Local::now().naive_local()),
        rows: records.len(),
        bytes,
    })
}

/// Download name for an export produced at `now`.
pub fn export_filename(now: NaiveDateTime) -> String {
    format!("consulta_os_filtrada_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}

/// Renders records into an xlsx workbook with a single sheet.
///
/// An empty slice produces a sheet holding a single explanatory message.
pub fn render(records: &[OrderRecord]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    let header = Format::new().set_bold();

    if records.is_empty() {
        sheet.write_string_with_format(0, 0, EMPTY_HEADER, &header)?;
        sheet.write_string(1, 0, EMPTY_MESSAGE)?;
        return Ok(workbook.save_to_buffer()?);
    }

    for (col, name) in schema::COLUMNS.iter().enumerate() {
        let title = if *name == AMOUNT_COLUMN { AMOUNT_HEADER } else { *name };
        sheet.write_string_with_format(0, col as u16, title, &header)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        for (col, value) in cells(record).into_iter().enumerate() {
            match value {
                Some(Out::Text(text)) => {
                    sheet.write_string(row, col as u16, text)?;
                }
                Some(Out::Number(n)) => {
                    sheet.write_number(row, col as u16, n)?;
                }
                None => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn text(value: &Option<String>) -> Option<Out> {
    value.clone().map(Out::Text)
}

/// `dd/mm/yyyy`, blank when the stored value is not a date.
fn day_first_date(value: &Option<String>) -> Option<Out> {
    let date: NaiveDate = parse_date_text(value.as_deref()?)?;
    Some(Out::Text(date.format("%d/%m/%Y").to_string()))
}

/// `dd/mm/yyyy HH:MM:SS`, blank when the stored value is not a timestamp.
fn day_first_timestamp(value: &Option<String>) -> Option<Out> {
    let raw = value.as_deref()?.trim();
    let ts = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| parse_date_text(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))?;
    Some(Out::Text(ts.format("%d/%m/%Y %H:%M:%S").to_string()))
}

/// One output cell per column, in storage order.
fn cells(r: &OrderRecord) -> [Option<Out>; 23] {
    [
        Some(Out::Number(r.id as f64)),
        text(&r.descricao_operacao),
        text(&r.numero_oportunidade),
        text(&r.numero_vta),
        text(&r.numero_cotacao),
        text(&r.numero_circuito),
        text(&r.status_cotacao),
        text(&r.denominacao_produto),
        r.quantidade.map(|q| Out::Number(q as f64)),
        text(&r.status),
        r.valor_pedido_bruto.map(Out::Number),
        day_first_date(&r.criado_em),
        text(&r.emissor_ordem),
        text(&r.nome_emissor_ordem),
        text(&r.nome_gerente_contas),
        text(&r.organizacao_vendas),
        text(&r.canal_distribuicao),
        text(&r.setor_atividade),
        text(&r.item_sd),
        text(&r.id_produto),
        text(&r.tempo_contrato),
        day_first_timestamp(&r.data_importacao),
        text(&r.data_atualizacao),
    ]
}
