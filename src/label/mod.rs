//! Label search client for the public drug-label API.
//!
//! # Architecture
//!
//! - [`LabelSearch`] - Async trait for one search window (HTTP or test fixture)
//! - [`LabelSearchClient`] - HTTP implementation with normalized errors
//! - [`SearchRequest`] - Field, values and pagination window of one search
//! - [`SearchPage`] - Records of one window plus the reported total
//! - [`LabelRecord`] - Opaque label document
//! - [`SearchError`] - Uniform failure type with a distinguished "no matches" kind
//! - [`MockLabelSearch`] - Rule-driven in-memory search for tests
//!
//! # Example
//!
//! ```no_run
//! use label_query_core::label::{LabelSearch, LabelSearchClient, SearchField, SearchRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = LabelSearchClient::new()?;
//! let request = SearchRequest::new(SearchField::SubstanceName, "aspirin", 100);
//! let page = client.search(&request, None).await?;
//! println!("{} of {} records", page.records.len(), page.total);
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod field;
mod http_client;
pub mod mock;
mod response;

pub use client::{DEFAULT_BASE_URL, LabelClientConfig, LabelSearch, LabelSearchClient};
pub use error::SearchError;
pub use field::{SearchField, SearchRequest};
pub use mock::MockLabelSearch;
pub use response::{LabelRecord, SearchPage};
