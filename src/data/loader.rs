use std::path::Path;

use anyhow::{Context, Result, bail};

use super::model::ParsedTable;
use super::parser::parse_csv;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a CSV file from disk into a [`ParsedTable`].
///
/// Only `.csv` and `.txt` files are accepted; content must be UTF-8. A
/// leading byte-order mark is skipped.
pub fn load_csv_file(path: &Path) -> Result<ParsedTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" | "txt" => {}
        other => bail!("Unsupported file extension: .{other}"),
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading CSV file {}", path.display()))?;
    let table = parse_csv(text.strip_prefix('\u{feff}').unwrap_or(&text));

    log::info!(
        "CSV loaded from {}: headers {:?}, {} rows",
        path.display(),
        table.headers,
        table.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv_file() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "a,b,failure\r\n1,2,0\r\n").unwrap();

        let table = load_csv_file(file.path()).unwrap();
        assert_eq!(table.headers, vec!["a", "b", "failure"]);
        assert_eq!(table.rows[0]["b"], "2");
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"\xEF\xBB\xBFfailure,a\n0,1\n1,2\n").unwrap();

        let table = load_csv_file(file.path()).unwrap();
        assert_eq!(table.headers, vec!["failure", "a"]);
        let prepared = crate::session::prepare_table(&table, "failure").unwrap();
        assert_eq!(prepared.feature_names, vec!["a"]);
        assert_eq!(prepared.len(), 2);
    }

    #[test]
    fn test_rejects_other_extensions() {
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let err = load_csv_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn test_missing_file_has_context() {
        let err = load_csv_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("reading CSV file"));
    }
}
