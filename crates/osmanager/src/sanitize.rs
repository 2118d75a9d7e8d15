//! Helpers for sanitizing untrusted names and log fields.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("valid filename regex"));

/// Returns only the filename component of a path (no directory).
///
/// Safe for log fields: reveals the file name without exposing where it lives.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

fn fold_ascii(c: char) -> char {
    match c {
        'á' | 'à' | 'ã' | 'â' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'õ' | 'ô' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'Á' | 'À' | 'Ã' | 'Â' | 'Ä' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Õ' | 'Ô' | 'Ö' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ç' => 'C',
        'Ñ' => 'N',
        other => other,
    }
}

/// Turns a client-supplied filename into one that is safe to join onto a
/// directory.
///
/// Accents are folded to ASCII, path separators become spaces, whitespace
/// runs become a single `_`, everything outside `[A-Za-z0-9_.-]` is dropped
/// and leading or trailing `.`/`_` are stripped. The result may be empty.
///
/// - `"Relatório Março.xlsx"` → `"Relatorio_Marco.xlsx"`
/// - `"../../etc/passwd"` → `"etc_passwd"`
pub fn secure_filename(name: &str) -> String {
    let folded: String = name
        .chars()
        .map(fold_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = folded.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = UNSAFE_FILENAME_CHARS.replace_all(&joined, "");
    stripped.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Lower-cased extension after the last `.`, if any.
pub fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_path_returns_filename() {
        assert_eq!(
            redact_path(Path::new("/home/user/uploads/pedidos.xlsx")),
            "pedidos.xlsx"
        );
    }

    #[test]
    fn test_redact_path_no_filename() {
        assert_eq!(redact_path(Path::new("/")), "<unknown>");
    }

    #[test]
    fn test_secure_filename_folds_accents() {
        assert_eq!(secure_filename("Relatório Março.xlsx"), "Relatorio_Marco.xlsx");
        assert_eq!(secure_filename("ORDENS_SERVIÇO.XLS"), "ORDENS_SERVICO.XLS");
    }

    #[test]
    fn test_secure_filename_strips_traversal() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(secure_filename("/abs/path/file.xlsx"), "abs_path_file.xlsx");
    }

    #[test]
    fn test_secure_filename_drops_unsafe_chars() {
        assert_eq!(secure_filename("pedidos (1)*.xlsx"), "pedidos_1.xlsx");
        assert_eq!(secure_filename("  spaced   out .xls "), "spaced_out_.xls");
    }

    #[test]
    fn test_secure_filename_may_be_empty() {
        assert_eq!(secure_filename("..."), "");
        assert_eq!(secure_filename("日本語"), "");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("a.XLSX").as_deref(), Some("xlsx"));
        assert_eq!(extension("archive.tar.xls").as_deref(), Some("xls"));
        assert_eq!(extension("noext"), None);
        assert_eq!(extension("trailing."), None);
    }
}
