//! Input parsing for substance name lists.
//!
//! This module turns raw user input into the names the query engine runs on.
//!
//! # Current Support
//!
//! - Free text separated by newlines or commas
//! - CSV uploads (every non-empty cell, quoted cells may contain commas)
//! - Compound names whose substances are joined with `;`
//!
//! # Example
//!
//! ```
//! use label_query_core::parser::{parse_substance_names, SubstanceQuery};
//!
//! let result = parse_substance_names("aspirin; caffeine\nibuprofen");
//! assert_eq!(result.len(), 2);
//!
//! let query = SubstanceQuery::parse(&result.names[0]);
//! assert!(query.is_compound());
//! ```

mod csv;
mod input;
mod names;
mod query;

pub use csv::parse_csv_names;
pub use input::ParseResult;
pub use names::parse_substance_names;
pub use query::{COMPOUND_SEPARATOR, SubstanceQuery};
