//! Cell coercion into stored values.
//!
//! Coercion never fails a row: anything that cannot be interpreted becomes
//! NULL (or "Sem Status" for the status field).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use rusqlite::types::Value;

use super::fields::FieldKind;
use super::workbook::Cell;

/// Status stored for rows without one.
pub const NO_STATUS: &str = "Sem Status";

const STATUS_MAP: [(&str, &str); 13] = [
    ("concluído", "Concluído"),
    ("concluido", "Concluído"),
    ("finalizado", "Concluído"),
    ("completo", "Concluído"),
    ("pendente", "Pendente"),
    ("aberto", "Aberto"),
    ("liberado", "Liberado"),
    ("liberada", "Liberado"),
    ("aprovado", "Aprovado"),
    ("em andamento", "Em Andamento"),
    ("processando", "Em Andamento"),
    ("cancelado", "Cancelado"),
    ("rejeitado", "Rejeitado"),
];

const DATE_TIME_FORMATS: [&str; 3] = ["%d.%m.%Y %H:%M:%S", "%d/%m/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

const FALLBACK_DATE_TIME_FORMATS: [&str; 7] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];
const FALLBACK_DATE_FORMATS: [&str; 4] = ["%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y", "%m/%d/%Y"];

/// Coerces a cell according to its field kind. A missing cell (unmapped
/// field or short row) is treated like an empty one.
pub fn coerce(kind: FieldKind, cell: Option<&Cell>) -> Value {
    let cell = cell.unwrap_or(&Cell::Empty);
    match kind {
        FieldKind::Text => cell_text(cell).map_or(Value::Null, Value::Text),
        FieldKind::Status => Value::Text(normalize_status(cell)),
        FieldKind::Amount => parse_amount(cell).map_or(Value::Null, Value::Real),
        FieldKind::Date => parse_date(cell)
            .map_or(Value::Null, |d| Value::Text(d.format("%Y-%m-%d").to_string())),
    }
}

/// Maps a raw status onto the canonical vocabulary.
///
/// Blank input yields "Sem Status". Unknown values are returned trimmed
/// with their original casing.
pub fn canonical_status(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NO_STATUS.to_string();
    }
    let lower = trimmed.to_lowercase();
    STATUS_MAP
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Status of any cell kind.
pub fn normalize_status(cell: &Cell) -> String {
    match cell_text(cell) {
        Some(text) => canonical_status(&text),
        None => NO_STATUS.to_string(),
    }
}

/// Amount of any cell kind.
pub fn parse_amount(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Cell::Text(s) => parse_amount_text(s),
        _ => None,
    }
}

/// Parses currency text.
///
/// A plain decimal is tried first. Otherwise the text is read as Brazilian
/// notation: "R$" dropped, "." as thousands separator, "," as decimal mark.
pub fn parse_amount_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(n) = finite(trimmed) {
        return Some(n);
    }
    let cleaned = trimmed
        .replace("R$", "")
        .replace('.', "")
        .replace(',', ".");
    finite(cleaned.trim())
}

fn finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Creation date of any cell kind.
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Text(s) => parse_date_text(s),
        Cell::Number(serial) | Cell::DateTime(serial) => serial_to_date(*serial),
        _ => None,
    }
}

/// Parses date text against the known layouts, then a few looser ones.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for fmt in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for fmt in FALLBACK_DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in FALLBACK_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return Some(d);
        }
    }
    None
}

/// Converts a day serial to a date, dropping any fraction of a day.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial.abs() > 3_000_000.0 {
        return None;
    }
    // Day zero of the 1900 date system, which absorbs the 1900 leap-year bug.
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.trunc() as i64))
}

/// Converts a day serial to a timestamp, keeping the time of day.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let date = serial_to_date(serial)?;
    let seconds = (serial.fract().abs() * 86_400.0).round() as i64;
    date.and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Renders a number the way a spreadsheet shows it: integral values
/// without a fractional part.
pub fn number_text(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Text stored for plain text fields. Blank cells yield `None`.
pub fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) if s.trim().is_empty() => None,
        Cell::Text(s) => Some(s.clone()),
        Cell::Number(n) => Some(number_text(*n)),
        Cell::Bool(b) => Some(b.to_string()),
        Cell::DateTime(serial) => {
            serial_to_datetime(*serial).map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        }
    }
}
