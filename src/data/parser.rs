use anyhow::{Context, Result};

use super::model::{ParsedTable, Row};

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Parse comma-separated text with a header row.
///
/// The parser is line-oriented: blank lines are dropped before tokenizing, so
/// quoted fields cannot span lines. Short rows are padded with empty cells,
/// cells beyond the header count are ignored.
pub fn parse_csv(text: &str) -> ParsedTable {
    let mut lines = text
        .split(['\r', '\n'])
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return ParsedTable::default();
    };
    let headers = split_line(header_line);

    let rows = lines
        .map(|line| {
            let mut cells = split_line(line);
            cells.resize(headers.len(), String::new());
            headers.iter().cloned().zip(cells).collect::<Row>()
        })
        .collect();

    ParsedTable { headers, rows }
}

/// Tokenize one line into trimmed cells.
///
/// `"` toggles quoting; `""` inside quotes is a literal quote. Commas only
/// separate cells outside quotes.
fn split_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);

    cells.into_iter().map(|c| c.trim().to_string()).collect()
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Serialize a table back to CSV text, quoting only where needed.
pub fn write_csv(headers: &[String], rows: &[Row]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers).context("writing CSV header")?;
    for (row_no, row) in rows.iter().enumerate() {
        let cells = headers
            .iter()
            .map(|h| row.get(h).map(String::as_str).unwrap_or(""));
        writer
            .write_record(cells)
            .with_context(|| format!("writing CSV row {row_no}"))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
