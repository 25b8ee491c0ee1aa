//! Concurrent query runs over a bounded worker pool.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::Stream;
use futures_util::stream;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::{QueryBatch, QueryOutcome};
use crate::resolver::SubstanceResolver;

/// Minimum allowed concurrency value.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
const MAX_CONCURRENCY: usize = 100;

/// Default number of workers per run.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Error type for starting query runs.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// No names were submitted.
    #[error("no names to query")]
    EmptyInput,

    /// The run's driver task panicked or was aborted.
    #[error("query run aborted: {0}")]
    RunAborted(String),
}

/// One entry of a run's event stream.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    /// A name moved to a new outcome.
    Transition {
        /// Name as submitted
        name: String,
        /// The outcome it moved to
        outcome: QueryOutcome,
    },
    /// Every worker of the run has stopped. Always the last event.
    Finished(RunSummary),
}

/// Counts for one finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Generation of the run
    pub generation: u64,
    /// Names published as `Success`
    pub succeeded: usize,
    /// Names published as `Failure`
    pub failed: usize,
    /// A later `start` or `reset` cancelled this run before it finished
    pub superseded: bool,
}

impl RunSummary {
    /// Names that reached a terminal outcome in this run.
    #[must_use]
    pub fn finished(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Handle to one started run.
///
/// Dropping the handle does not stop the run; use
/// [`QueryOrchestrator::reset`] or start another run for that.
#[derive(Debug)]
pub struct QueryRun {
    generation: u64,
    events: mpsc::UnboundedReceiver<BatchEvent>,
    driver: JoinHandle<RunSummary>,
}

impl QueryRun {
    /// Generation stamped on this run's batch.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Next event, or `None` once the stream is exhausted.
    ///
    /// Every name's `Pending` transition is queued before any worker starts.
    pub async fn next_event(&mut self) -> Option<BatchEvent> {
        self.events.recv().await
    }

    /// Waits for every worker of the run to stop.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::RunAborted`] if the driver task panicked.
    pub async fn wait(self) -> Result<RunSummary, QueryError> {
        self.driver
            .await
            .map_err(|error| QueryError::RunAborted(error.to_string()))
    }

    /// Consumes the handle into a stream of its events.
    ///
    /// The stream ends after [`BatchEvent::Finished`]; the driver keeps
    /// running to completion even if the stream is dropped early.
    pub fn into_events(self) -> impl Stream<Item = BatchEvent> + Send + Unpin {
        Box::pin(stream::unfold(self.events, |mut events| async move {
            events.recv().await.map(|event| (event, events))
        }))
    }
}

/// Runs [`SubstanceResolver`] over many names with a fixed worker pool.
///
/// The orchestrator owns the current [`QueryBatch`]. Workers are its only
/// writers and every write goes through one `watch` channel, so readers only
/// ever see whole snapshots.
///
/// # Concurrency Model
///
/// - `min(concurrency, names)` workers pull names FIFO from one shared queue
/// - Each worker publishes `InProgress`, resolves, then publishes the terminal outcome
/// - Starting a run cancels the previous one; its late writes carry a stale
///   generation and are discarded
#[derive(Debug)]
pub struct QueryOrchestrator {
    resolver: SubstanceResolver,
    concurrency: usize,
    state: Arc<watch::Sender<QueryBatch>>,
    generation: AtomicU64,
    active: Mutex<Option<CancellationToken>>,
}

impl QueryOrchestrator {
    /// Creates an orchestrator with the given worker count.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    #[instrument(level = "debug", skip(resolver))]
    pub fn new(resolver: SubstanceResolver, concurrency: usize) -> Result<Self, QueryError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(QueryError::InvalidConcurrency { value: concurrency });
        }

        Ok(Self::build(resolver, concurrency))
    }

    /// Creates an orchestrator with [`DEFAULT_CONCURRENCY`] workers.
    #[must_use]
    pub fn with_default_concurrency(resolver: SubstanceResolver) -> Self {
        Self::build(resolver, DEFAULT_CONCURRENCY)
    }

    fn build(resolver: SubstanceResolver, concurrency: usize) -> Self {
        let (state, _) = watch::channel(QueryBatch::empty(0));
        Self {
            resolver,
            concurrency,
            state: Arc::new(state),
            generation: AtomicU64::new(0),
            active: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Receiver of batch snapshots; sees every later publish.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<QueryBatch> {
        self.state.subscribe()
    }

    /// The current batch.
    #[must_use]
    pub fn snapshot(&self) -> QueryBatch {
        self.state.borrow().clone()
    }

    /// Starts a run over `names`, replacing the current batch.
    ///
    /// Every name is published as `Pending` before any search is issued.
    /// Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyInput`] when `names` is empty; the current
    /// batch and any active run are left untouched.
    #[instrument(skip(self, names, api_key))]
    pub fn start<I, S>(&self, names: I, api_key: Option<&str>) -> Result<QueryRun, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(QueryError::EmptyInput);
        }

        let cancel = CancellationToken::new();
        let mut queue = VecDeque::new();
        let generation = self.begin_generation(Some(cancel.clone()), |generation| {
            let batch = QueryBatch::new(generation, names);
            queue = batch.names().map(str::to_string).collect();
            batch
        });
        let workers = self.concurrency.min(queue.len());

        let (events, receiver) = mpsc::unbounded_channel();
        for name in &queue {
            let _ = events.send(BatchEvent::Transition {
                name: name.clone(),
                outcome: QueryOutcome::Pending,
            });
        }

        info!(
            generation,
            names = queue.len(),
            workers,
            "starting query run"
        );

        let run = RunContext {
            generation,
            resolver: self.resolver.clone(),
            api_key: api_key.map(str::to_string),
            state: Arc::clone(&self.state),
            events,
            queue: Arc::new(Mutex::new(queue)),
            cancel,
        };
        let driver = tokio::spawn(drive(run, workers));

        Ok(QueryRun {
            generation,
            events: receiver,
            driver,
        })
    }

    /// Starts a run and waits for it, returning the final batch.
    ///
    /// # Errors
    ///
    /// As [`start`](Self::start) and [`QueryRun::wait`].
    pub async fn run<I, S>(&self, names: I, api_key: Option<&str>) -> Result<QueryBatch, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start(names, api_key)?.wait().await?;
        Ok(self.snapshot())
    }

    /// Cancels the active run and publishes an empty batch.
    pub fn reset(&self) {
        let generation = self.begin_generation(None, QueryBatch::empty);
        debug!(generation, "query batch reset");
    }

    /// Cancels the active run, then publishes the batch for the next
    /// generation. Both happen under the `active` lock so published batches
    /// always appear in generation order.
    fn begin_generation<F>(&self, next: Option<CancellationToken>, batch: F) -> u64
    where
        F: FnOnce(u64) -> QueryBatch,
    {
        let mut active = lock(&self.active);
        if let Some(previous) = active.take() {
            previous.cancel();
        }
        *active = next;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_replace(batch(generation));
        generation
    }
}

impl Drop for QueryOrchestrator {
    fn drop(&mut self) {
        if let Some(token) = lock(&self.active).take() {
            token.cancel();
        }
    }
}

/// Everything the workers of one run share.
#[derive(Clone)]
struct RunContext {
    generation: u64,
    resolver: SubstanceResolver,
    api_key: Option<String>,
    state: Arc<watch::Sender<QueryBatch>>,
    events: mpsc::UnboundedSender<BatchEvent>,
    queue: Arc<Mutex<VecDeque<String>>>,
    cancel: CancellationToken,
}

impl RunContext {
    fn next_name(&self) -> Option<String> {
        if self.cancel.is_cancelled() {
            return None;
        }
        lock(&self.queue).pop_front()
    }

    /// Publishes one transition; returns false when the batch rejected it.
    fn publish(&self, name: &str, outcome: QueryOutcome) -> bool {
        let applied = self
            .state
            .send_if_modified(|batch| batch.apply(self.generation, name, outcome.clone()));
        if applied {
            let _ = self.events.send(BatchEvent::Transition {
                name: name.to_string(),
                outcome,
            });
        }
        applied
    }
}

async fn drive(run: RunContext, workers: usize) -> RunSummary {
    let mut pool = JoinSet::new();
    for _ in 0..workers {
        pool.spawn(worker(run.clone()));
    }

    let mut summary = RunSummary {
        generation: run.generation,
        ..RunSummary::default()
    };
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok((succeeded, failed)) => {
                summary.succeeded += succeeded;
                summary.failed += failed;
            }
            Err(error) => warn!(error = %error, "query worker panicked"),
        }
    }
    summary.superseded = run.cancel.is_cancelled();

    info!(
        generation = summary.generation,
        succeeded = summary.succeeded,
        failed = summary.failed,
        superseded = summary.superseded,
        "query run finished"
    );
    let _ = run.events.send(BatchEvent::Finished(summary));
    summary
}

async fn worker(run: RunContext) -> (usize, usize) {
    let mut succeeded = 0;
    let mut failed = 0;

    while let Some(name) = run.next_name() {
        if !run.publish(&name, QueryOutcome::InProgress) {
            break;
        }

        let outcome = match run
            .resolver
            .resolve_with_cancel(&name, run.api_key.as_deref(), &run.cancel)
            .await
        {
            Ok(found) => QueryOutcome::Success(found),
            Err(error) => QueryOutcome::Failure(error.to_string()),
        };
        let success = outcome.is_success();

        if !run.publish(&name, outcome) {
            debug!(name = %name, "discarding outcome of superseded run");
            break;
        }
        if success {
            succeeded += 1;
        } else {
            failed += 1;
        }
    }

    (succeeded, failed)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
