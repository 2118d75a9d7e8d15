//! Spreadsheet reading via calamine.
//!
//! Only the first worksheet is read. Its first row is the header row and
//! every following row is data.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use super::IngestError;

/// A typed spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Native date cell, as a day serial counted from 1899-12-30.
    DateTime(f64),
}

impl Cell {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            // #N/A, #DIV/0! and friends carry no usable value.
            Data::Error(_) => Cell::Empty,
        }
    }
}

/// The header row and data rows of one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// Reads the first worksheet of an `.xls` or `.xlsx` file on disk.
pub fn read_first_sheet(path: &Path) -> Result<Sheet, IngestError> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::Workbook {
        message: format!("failed to read '{}': {}", crate::sanitize::redact_path(path), e),
    })?;
    read_first_sheet_from_bytes(bytes)
}

/// Reads the first worksheet of an in-memory workbook. The format is
/// detected from the content, not the file name.
///
/// Header text is trimmed; blank headers become `Unnamed: <index>`. Rows in
/// which every cell is blank are dropped.
pub fn read_first_sheet_from_bytes(bytes: Vec<u8>) -> Result<Sheet, IngestError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| IngestError::Workbook {
            message: e.to_string(),
        })?;

    let name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::Workbook {
            message: "workbook has no sheets".to_string(),
        })?;

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| IngestError::Workbook {
            message: format!("failed to read sheet '{}': {}", name, e),
        })?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| header_text(i, cell))
            .collect(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(Cell::from).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(Cell::is_blank))
        .collect();

    log::debug!(
        "Read sheet '{}' with {} columns and {} rows",
        name,
        headers.len(),
        rows.len()
    );

    Ok(Sheet {
        name,
        headers,
        rows,
    })
}

fn header_text(index: usize, cell: &Data) -> String {
    let text = match Cell::from(cell) {
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(f) => super::normalize::number_text(f),
        Cell::Bool(b) => b.to_string(),
        Cell::DateTime(serial) => super::normalize::serial_to_datetime(serial)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        Cell::Empty => String::new(),
    };
    if text.is_empty() {
        format!("Unnamed: {}", index)
    } else {
        text
    }
}
