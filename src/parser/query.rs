//! Compound-aware substance query segmentation.

use std::fmt;

/// Separator between the substances of a compound name.
pub const COMPOUND_SEPARATOR: char = ';';

/// One user-entered name and its substance segments.
///
/// A plain name has exactly one segment; a compound name (`"aspirin; caffeine"`)
/// has one segment per co-formulated substance. Segments are trimmed and blank
/// segments are discarded, so a name made only of separators has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstanceQuery {
    raw: String,
    segments: Vec<String>,
}

impl SubstanceQuery {
    /// Parses a raw name into its ordered segments.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split(COMPOUND_SEPARATOR)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    /// The name exactly as the user entered it.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Trimmed, non-empty segments in input order.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of substances named.
    #[must_use]
    pub fn substance_count(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when the name joins two or more substances.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.segments.len() >= 2
    }
}

impl fmt::Display for SubstanceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
