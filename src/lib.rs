//! Label Query Core Library
//!
//! This library resolves user-entered drug substance names to exactly one
//! label record from a public label-search API, running many lookups in
//! parallel and publishing per-name progress for a presentation layer.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`parser`] - Input parsing for name lists, CSV cells and compound names
//! - [`label`] - Label search client with normalized API errors
//! - [`resolver`] - Substance resolution (direct match, pagination, brand fallback, compounds)
//! - [`query`] - Concurrent query orchestration with live batch snapshots
//! - [`record`] - Flattening and field selection over label records

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod label;
pub mod parser;
pub mod query;
pub mod record;
pub mod resolver;
#[cfg(test)]
pub mod test_support;
pub(crate) mod user_agent;

// Re-export commonly used types
pub use label::{
    DEFAULT_BASE_URL, LabelClientConfig, LabelRecord, LabelSearch, LabelSearchClient, SearchError,
    SearchField, SearchPage, SearchRequest,
};
pub use parser::{ParseResult, SubstanceQuery, parse_csv_names, parse_substance_names};
pub use query::{
    BatchEvent, DEFAULT_CONCURRENCY, QueryBatch, QueryError, QueryOrchestrator, QueryOutcome,
    QueryRun, RunSummary,
};
pub use record::{
    available_field_keys, field_counts, flatten_record, missing_selected_fields, select_fields,
};
pub use resolver::{
    LabelMatch, ResolutionPath, ResolveError, ResolverSettings, SettingsError, SubstanceResolver,
};
