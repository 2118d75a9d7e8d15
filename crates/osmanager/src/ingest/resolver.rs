//! Maps spreadsheet headers onto the field registry.

use std::fmt;

use super::fields::{FieldSpec, FIELDS};

/// A header chosen for a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Position of the header in the sheet.
    pub index: usize,
    /// Header text as it appears in the sheet.
    pub header: String,
}

/// Result of resolving a header row: one optional binding per registry field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    bindings: Vec<(&'static FieldSpec, Option<Binding>)>,
}

impl ColumnMap {
    /// Binding for the given storage column, if one was found.
    pub fn get(&self, column: &str) -> Option<&Binding> {
        self.bindings
            .iter()
            .find(|(field, _)| field.column == column)
            .and_then(|(_, binding)| binding.as_ref())
    }

    /// All registry fields in order, with their binding.
    pub fn iter(&self) -> impl Iterator<Item = (&'static FieldSpec, Option<&Binding>)> + '_ {
        self.bindings.iter().map(|(field, b)| (*field, b.as_ref()))
    }

    /// Number of fields that found a header.
    pub fn resolved_count(&self) -> usize {
        self.bindings.iter().filter(|(_, b)| b.is_some()).count()
    }
}

impl fmt::Display for ColumnMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .bindings
            .iter()
            .filter_map(|(field, b)| {
                b.as_ref()
                    .map(|b| format!("{}<-'{}'", field.column, b.header))
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Resolves every registry field against the header row.
///
/// For each field the candidate phrases are tried in order. A candidate
/// first looks for a header equal to it (case-insensitive), then for the
/// first header, in sheet order, that contains it. The first candidate that
/// hits wins. Nothing prevents two fields from landing on the same header.
pub fn resolve(headers: &[String]) -> ColumnMap {
    let upper: Vec<String> = headers.iter().map(|h| h.trim().to_uppercase()).collect();

    let bindings = FIELDS
        .iter()
        .map(|field| {
            let index = field
                .candidates
                .iter()
                .find_map(|candidate| match_candidate(&upper, candidate));
            let binding = index.map(|index| Binding {
                index,
                header: headers[index].clone(),
            });
            (field, binding)
        })
        .collect();

    ColumnMap { bindings }
}

fn match_candidate(upper_headers: &[String], candidate: &str) -> Option<usize> {
    upper_headers
        .iter()
        .position(|h| h == candidate)
        .or_else(|| upper_headers.iter().position(|h| h.contains(candidate)))
}
