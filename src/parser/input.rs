//! Types representing parsed name lists.

use std::collections::HashSet;
use std::fmt;

/// Collection of substance names extracted from user input.
///
/// Names are kept unique in first-occurrence order; repeated entries are
/// recorded in `duplicates` so callers can report them.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// Unique names in input order
    pub names: Vec<String>,
    /// Entries dropped because an identical name appeared earlier
    pub duplicates: Vec<String>,
}

impl ParseResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a result from raw entries, dropping repeats after the first.
    #[must_use]
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        let mut result = Self::new();
        for entry in entries {
            if seen.insert(entry.clone()) {
                result.names.push(entry);
            } else {
                result.duplicates.push(entry);
            }
        }
        result
    }

    /// Appends another result, keeping names unique across both.
    pub fn merge(&mut self, other: ParseResult) {
        let mut seen: HashSet<String> = self.names.iter().cloned().collect();
        for name in other.names {
            if seen.insert(name.clone()) {
                self.names.push(name);
            } else {
                self.duplicates.push(name);
            }
        }
        self.duplicates.extend(other.duplicates);
    }

    /// Returns true if no names were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns count of unique names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns count of dropped duplicate entries.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }
}

impl fmt::Display for ParseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parsed {} names ({} duplicates)",
            self.names.len(),
            self.duplicates.len()
        )
    }
}
