//! In-memory label search for testing purposes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::{LabelRecord, LabelSearch, SearchError, SearchField, SearchPage, SearchRequest};

/// Message the live API uses for an empty result set.
pub const NO_MATCHES_MESSAGE: &str = "No matches found!";

#[derive(Debug, Clone)]
struct MockRule {
    field: SearchField,
    values: Vec<String>,
    skip: Option<u64>,
    response: Result<SearchPage, SearchError>,
}

impl MockRule {
    fn matches(&self, request: &SearchRequest) -> bool {
        self.field == request.field
            && self.values == request.values
            && self.skip.is_none_or(|skip| skip == request.skip)
    }
}

/// A label search that answers from predefined rules.
///
/// Requests with no matching rule fail with [`SearchError::NoMatches`], like
/// the live API. Every request is recorded, and the number of searches in
/// flight at once is tracked so tests can check concurrency bounds.
#[derive(Debug, Default)]
pub struct MockLabelSearch {
    rules: Mutex<Vec<MockRule>>,
    calls: Mutex<Vec<SearchRequest>>,
    delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLabelSearch {
    /// Creates a mock with no rules and no delay.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers searches on `field` for exactly `values` at any skip.
    pub fn respond(
        &self,
        field: SearchField,
        values: &[&str],
        response: Result<SearchPage, SearchError>,
    ) {
        self.push_rule(field, values, None, response);
    }

    /// Answers searches on `field` for exactly `values` at one skip offset.
    pub fn respond_at(
        &self,
        field: SearchField,
        values: &[&str],
        skip: u64,
        response: Result<SearchPage, SearchError>,
    ) {
        self.push_rule(field, values, Some(skip), response);
    }

    /// Removes every rule; later searches report no matches.
    pub fn clear_rules(&self) {
        lock(&self.rules).clear();
    }

    /// Delays every subsequent search by `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = delay;
    }

    /// Requests received so far, in arrival order.
    #[must_use]
    pub fn calls(&self) -> Vec<SearchRequest> {
        lock(&self.calls).clone()
    }

    /// Number of requests received on `field`.
    #[must_use]
    pub fn call_count(&self, field: SearchField) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|request| request.field == field)
            .count()
    }

    /// Highest number of searches that were in flight at the same time.
    #[must_use]
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn push_rule(
        &self,
        field: SearchField,
        values: &[&str],
        skip: Option<u64>,
        response: Result<SearchPage, SearchError>,
    ) {
        // Later rules take precedence over earlier ones.
        lock(&self.rules).insert(
            0,
            MockRule {
                field,
                values: values.iter().map(|value| (*value).to_string()).collect(),
                skip,
                response,
            },
        );
    }

    fn answer(&self, request: &SearchRequest) -> Result<SearchPage, SearchError> {
        lock(&self.rules)
            .iter()
            .find(|rule| rule.matches(request))
            .map_or_else(|| Err(no_matches()), |rule| rule.response.clone())
    }
}

#[async_trait]
impl LabelSearch for MockLabelSearch {
    async fn search(
        &self,
        request: &SearchRequest,
        _api_key: Option<&str>,
    ) -> Result<SearchPage, SearchError> {
        lock(&self.calls).push(request.clone());
        let answer = self.answer(request);
        let delay = *lock(&self.delay);

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        answer
    }
}

/// Decrements the in-flight counter when a search finishes or is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The error the live API returns for an empty result set.
#[must_use]
pub fn no_matches() -> SearchError {
    SearchError::NoMatches {
        message: NO_MATCHES_MESSAGE.to_string(),
    }
}

/// Builds a label record with the given `openfda` substance and brand names.
#[must_use]
pub fn label_record(id: &str, substances: &[&str], brands: &[&str]) -> LabelRecord {
    LabelRecord::new(serde_json::json!({
        "id": id,
        "openfda": {
            "substance_name": substances,
            "brand_name": brands,
        }
    }))
}

/// Builds a page whose total is the number of records.
#[must_use]
pub fn page_of(records: Vec<LabelRecord>) -> SearchPage {
    let total = records.len() as u64;
    SearchPage::new(records, total)
}
