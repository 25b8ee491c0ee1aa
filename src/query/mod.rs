//! Query orchestration: many names, one bounded worker pool, live status.
//!
//! # Architecture
//!
//! - [`QueryOrchestrator`] - Owns the current batch and starts runs
//! - [`QueryRun`] - Handle to one run: event stream and completion summary
//! - [`QueryBatch`] - Name to [`QueryOutcome`] map in input order
//! - [`BatchEvent`] - Per-name transitions, then one `Finished`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use label_query_core::label::LabelSearchClient;
//! use label_query_core::query::{QueryOrchestrator, DEFAULT_CONCURRENCY};
//! use label_query_core::resolver::SubstanceResolver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = SubstanceResolver::new(Arc::new(LabelSearchClient::new()?));
//! let orchestrator = QueryOrchestrator::new(resolver, DEFAULT_CONCURRENCY)?;
//! let batch = orchestrator.run(["aspirin", "ibuprofen"], None).await?;
//! for (name, outcome) in batch.iter() {
//!     println!("{name}: {outcome}");
//! }
//! # Ok(())
//! # }
//! ```

mod orchestrator;
mod outcome;

pub use orchestrator::{
    BatchEvent, DEFAULT_CONCURRENCY, QueryError, QueryOrchestrator, QueryRun, RunSummary,
};
pub use outcome::{QueryBatch, QueryOutcome};
