//! Free-text name list parsing.

use super::ParseResult;

/// Splits free text into substance names.
///
/// Entries are separated by newlines or commas; each entry is trimmed and
/// blank entries are dropped. Semicolons are left alone because they join the
/// segments of a compound name.
#[must_use]
pub fn parse_substance_names(text: &str) -> ParseResult {
    ParseResult::from_entries(
        text.split(['\n', ','])
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string),
    )
}
