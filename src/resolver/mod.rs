//! Substance resolution: one user-entered name to exactly one label record.
//!
//! # Architecture
//!
//! - [`SubstanceResolver`] - Drives the resolution state machine over a [`LabelSearch`](crate::label::LabelSearch)
//! - [`LabelMatch`] - The picked record plus how it was found
//! - [`ResolutionPath`] - Which branch of the state machine produced the match
//! - [`ResolverSettings`] - Page sizes and the compound scan cap
//! - [`ResolveError`] - Domain failure for one name
//! - [`SettingsError`] - Rejected page sizes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use label_query_core::label::LabelSearchClient;
//! use label_query_core::resolver::SubstanceResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = SubstanceResolver::new(Arc::new(LabelSearchClient::new()?));
//! let found = resolver.resolve("aspirin; caffeine", None).await?;
//! println!("resolved via {} ({} candidates)", found.path, found.total);
//! # Ok(())
//! # }
//! ```

mod error;
mod matching;
mod step;
mod substance;

pub use error::{ResolveError, SettingsError};
pub use substance::SubstanceResolver;

use std::fmt;

use crate::label::LabelRecord;

/// Default window for direct substance and brand searches.
pub const DEFAULT_PAGE_SIZE: u64 = 100;
/// Window used when scanning past the first substance-name page.
pub const SCAN_PAGE_SIZE: u64 = 1000;
/// Window used for AND-joined compound searches.
pub const COMPOUND_PAGE_SIZE: u64 = 50;
/// Compound scans stop once `skip` reaches this many records.
pub const COMPOUND_SKIP_CAP: u64 = 25_000;

/// Page sizes used by [`SubstanceResolver`].
///
/// Every page size must be at least 1; [`SubstanceResolver::with_settings`]
/// rejects anything else. A compound skip cap of 0 is allowed and makes every
/// compound name fail without searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Direct and brand search window
    pub page_size: u64,
    /// Pagination window for single-substance scans
    pub scan_page_size: u64,
    /// Compound search window
    pub compound_page_size: u64,
    /// Upper bound on compound `skip`
    pub compound_skip_cap: u64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            scan_page_size: SCAN_PAGE_SIZE,
            compound_page_size: COMPOUND_PAGE_SIZE,
            compound_skip_cap: COMPOUND_SKIP_CAP,
        }
    }
}

impl ResolverSettings {
    /// Creates validated settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroPageSize`] when any page size is zero.
    pub fn new(
        page_size: u64,
        scan_page_size: u64,
        compound_page_size: u64,
        compound_skip_cap: u64,
    ) -> Result<Self, SettingsError> {
        let settings = Self {
            page_size,
            scan_page_size,
            compound_page_size,
            compound_skip_cap,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that every scan window advances.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroPageSize`] naming the first zero page size.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (setting, value) in [
            ("page_size", self.page_size),
            ("scan_page_size", self.scan_page_size),
            ("compound_page_size", self.compound_page_size),
        ] {
            if value == 0 {
                return Err(SettingsError::ZeroPageSize { setting });
            }
        }
        Ok(())
    }
}

/// Branch of the resolution state machine that produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionPath {
    /// First substance-name page
    Direct,
    /// Later substance-name scan window
    Paginated,
    /// Top brand-name result
    BrandFallback,
    /// AND-joined compound scan
    Compound,
}

impl ResolutionPath {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Paginated => "paginated",
            Self::BrandFallback => "brand_fallback",
            Self::Compound => "compound",
        }
    }
}

impl fmt::Display for ResolutionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved name.
///
/// `composite` is true when the resolver picked the record out of a result
/// page, and false when the record is the raw top hit of a brand search.
/// Either way exactly one record is carried.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMatch {
    /// The selected label document
    pub record: LabelRecord,
    /// Total reported by the search that produced the record
    pub total: u64,
    /// Resolver-picked (true) or raw API top hit (false)
    pub composite: bool,
    /// How the record was found
    pub path: ResolutionPath,
}

impl LabelMatch {
    /// A record selected by a matching predicate.
    pub(crate) fn picked(record: LabelRecord, total: u64, path: ResolutionPath) -> Self {
        Self {
            record,
            total,
            composite: true,
            path,
        }
    }

    /// The unfiltered top record of a search.
    pub(crate) fn raw(record: LabelRecord, total: u64, path: ResolutionPath) -> Self {
        Self {
            record,
            total,
            composite: false,
            path,
        }
    }

    /// The one-record result list downstream formatting expects.
    #[must_use]
    pub fn as_results(&self) -> Vec<&LabelRecord> {
        vec![&self.record]
    }
}
