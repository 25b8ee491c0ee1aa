//! CSV upload parsing.
//!
//! Every non-empty cell of every row becomes a name. Commas inside double
//! quotes do not split cells.

use super::ParseResult;

/// Extracts names from CSV text.
#[must_use]
pub fn parse_csv_names(text: &str) -> ParseResult {
    ParseResult::from_entries(
        text.lines()
            .flat_map(split_csv_line)
            .map(|cell| strip_surrounding_quotes(cell.trim()).trim().to_string())
            .filter(|cell| !cell.is_empty()),
    )
}

/// Splits one CSV row on commas that sit outside double quotes.
fn split_csv_line(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            ',' if !in_quotes => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);
    cells
}

/// Removes one leading and one trailing double quote, if present.
fn strip_surrounding_quotes(cell: &str) -> &str {
    let cell = cell.strip_prefix('"').unwrap_or(cell);
    cell.strip_suffix('"').unwrap_or(cell)
}
