//! Builders for spreadsheets and order rows used across tests.

#![allow(dead_code)]

use rusqlite::types::Value;
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

use osmanager::db::order_repo::NewOrder;

/// A cell to write into a test workbook.
#[derive(Debug, Clone)]
pub enum CellSpec {
    Text(String),
    Number(f64),
    /// A native date cell (year, month, day).
    Date(u16, u8, u8),
    Blank,
}

impl From<&str> for CellSpec {
    fn from(value: &str) -> Self {
        CellSpec::Text(value.to_string())
    }
}

impl From<f64> for CellSpec {
    fn from(value: f64) -> Self {
        CellSpec::Number(value)
    }
}

/// Builds `.xlsx` bytes with a header row and typed data rows.
pub struct WorkbookBuilder {
    sheet_name: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<CellSpec>>,
}

impl WorkbookBuilder {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            sheet_name: None,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn sheet_name(mut self, name: &str) -> Self {
        self.sheet_name = Some(name.to_string());
        self
    }

    pub fn row(mut self, cells: Vec<CellSpec>) -> Self {
        self.rows.push(cells);
        self
    }

    /// Adds a row of text cells.
    pub fn text_row(self, cells: &[&str]) -> Self {
        self.row(cells.iter().map(|c| CellSpec::from(*c)).collect())
    }

    pub fn build(self) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("dd/mm/yyyy");
        let sheet = workbook.add_worksheet();
        if let Some(name) = &self.sheet_name {
            sheet.set_name(name).expect("valid sheet name");
        }

        for (col, header) in self.headers.iter().enumerate() {
            sheet
                .write_string(0, col as u16, header)
                .expect("write header");
        }

        for (i, row) in self.rows.iter().enumerate() {
            let r = i as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    CellSpec::Text(s) => {
                        sheet.write_string(r, col, s).expect("write text");
                    }
                    CellSpec::Number(n) => {
                        sheet.write_number(r, col, *n).expect("write number");
                    }
                    CellSpec::Date(y, m, d) => {
                        let date = ExcelDateTime::from_ymd(*y, *m, *d).expect("valid date");
                        sheet
                            .write_datetime_with_format(r, col, &date, &date_format)
                            .expect("write date");
                    }
                    CellSpec::Blank => {}
                }
            }
        }

        workbook.save_to_buffer().expect("save workbook")
    }
}

/// Builds an insertable order row.
#[derive(Default)]
pub struct OrderBuilder {
    values: Vec<(&'static str, Value)>,
}

impl OrderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn text(mut self, column: &'static str, value: &str) -> Self {
        self.values.push((column, Value::Text(value.to_string())));
        self
    }

    pub fn cliente(self, value: &str) -> Self {
        self.text("nome_emissor_ordem", value)
    }

    pub fn descricao(self, value: &str) -> Self {
        self.text("descricao_operacao", value)
    }

    pub fn status(self, value: &str) -> Self {
        self.text("status", value)
    }

    pub fn status_cotacao(self, value: &str) -> Self {
        self.text("status_cotacao", value)
    }

    pub fn produto(self, value: &str) -> Self {
        self.text("denominacao_produto", value)
    }

    pub fn criado_em(self, value: &str) -> Self {
        self.text("criado_em", value)
    }

    pub fn valor(mut self, value: f64) -> Self {
        self.values.push(("valor_pedido_bruto", Value::Real(value)));
        self
    }

    pub fn build(self) -> NewOrder {
        NewOrder {
            values: self.values,
        }
    }
}
