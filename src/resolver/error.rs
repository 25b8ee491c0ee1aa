//! Error types for substance resolution.

use thiserror::Error;

use crate::label::SearchError;

/// Errors that can occur while resolving one name to a label record.
///
/// The `Display` text is the message shown for a failed name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Input had no substance segments after parsing
    #[error("empty name")]
    EmptyName,

    /// A search failed in a way no fallback handles
    #[error(transparent)]
    Search(#[from] SearchError),

    /// The compound scan found no label with the requested substance set
    #[error("no matching label found with exactly {substance_count} substance(s)")]
    NoMatchingLabel {
        /// Number of substances the name asked for
        substance_count: usize,
    },

    /// Brand fallback succeeded but returned no records
    #[error("no label found for brand name '{name}'")]
    BrandNotFound {
        /// The brand searched for
        name: String,
    },

    /// The run owning this resolution was superseded or reset
    #[error("resolution cancelled")]
    Cancelled,
}

/// Rejected [`ResolverSettings`](super::ResolverSettings).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A search window of zero records would never advance a scan
    #[error("invalid resolver setting `{setting}`: page size must be at least 1")]
    ZeroPageSize {
        /// Name of the offending field
        setting: &'static str,
    },
}

impl ResolveError {
    /// True when the underlying search reported "no matches".
    #[must_use]
    pub fn is_no_matches(&self) -> bool {
        matches!(self, Self::Search(error) if error.is_no_matches())
    }
}
