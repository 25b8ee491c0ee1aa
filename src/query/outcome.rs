//! Per-name outcomes and the batch that owns them.

use std::fmt;

use indexmap::IndexMap;

use crate::resolver::LabelMatch;

/// Status of one name within a batch.
///
/// Moves forward only: `Pending -> InProgress -> Success | Failure`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Published when the batch starts
    Pending,
    /// A worker is resolving the name
    InProgress,
    /// The name resolved to one record
    Success(LabelMatch),
    /// Resolution failed; the message is shown to the user
    Failure(String),
}

impl QueryOutcome {
    /// True for `Success` and `Failure`.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failure(_))
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The resolved match, if any.
    #[must_use]
    pub fn as_match(&self) -> Option<&LabelMatch> {
        match self {
            Self::Success(found) => Some(found),
            _ => None,
        }
    }

    /// The failure message, if any.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Success(_) => "success",
            Self::Failure(_) => "failure",
        }
    }

    fn stage(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::InProgress => 1,
            Self::Success(_) | Self::Failure(_) => 2,
        }
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(message) => write!(f, "failure: {message}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Outcomes of one run, keyed by name in input order.
///
/// Every batch carries the generation of the run that created it. Updates
/// from any other generation are ignored, as are updates that would move a
/// name backwards or touch a name that already reached a terminal outcome.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryBatch {
    generation: u64,
    outcomes: IndexMap<String, QueryOutcome>,
}

impl QueryBatch {
    /// A batch with every name `Pending`. Repeated names share one slot at
    /// the position of their first occurrence.
    #[must_use]
    pub fn new<I, S>(generation: u64, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut outcomes = IndexMap::new();
        for name in names {
            outcomes.entry(name.into()).or_insert(QueryOutcome::Pending);
        }
        Self {
            generation,
            outcomes,
        }
    }

    /// Rebuilds a batch from saved `(name, outcome)` pairs, for example a
    /// finished batch reloaded for display. Repeated names keep the first pair.
    #[must_use]
    pub fn from_outcomes<I>(generation: u64, outcomes: I) -> Self
    where
        I: IntoIterator<Item = (String, QueryOutcome)>,
    {
        let mut map = IndexMap::new();
        for (name, outcome) in outcomes {
            map.entry(name).or_insert(outcome);
        }
        Self {
            generation,
            outcomes: map,
        }
    }

    /// A batch with no names.
    #[must_use]
    pub fn empty(generation: u64) -> Self {
        Self {
            generation,
            outcomes: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&QueryOutcome> {
        self.outcomes.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Names in input order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.outcomes.keys().map(String::as_str)
    }

    /// `(name, outcome)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryOutcome)> {
        self.outcomes
            .iter()
            .map(|(name, outcome)| (name.as_str(), outcome))
    }

    /// Successful names with their matches, in input order.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &LabelMatch)> {
        self.iter()
            .filter_map(|(name, outcome)| outcome.as_match().map(|found| (name, found)))
    }

    /// True iff every outcome is terminal. An empty batch is finished.
    #[must_use]
    pub fn all_finished(&self) -> bool {
        self.outcomes.values().all(QueryOutcome::is_terminal)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, QueryOutcome::Pending))
    }

    #[must_use]
    pub fn in_progress_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, QueryOutcome::InProgress))
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.count(QueryOutcome::is_success)
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, QueryOutcome::Failure(_)))
    }

    /// Number of names with a terminal outcome.
    #[must_use]
    pub fn finished_count(&self) -> usize {
        self.count(QueryOutcome::is_terminal)
    }

    fn count(&self, predicate: impl Fn(&QueryOutcome) -> bool) -> usize {
        self.outcomes.values().filter(|outcome| predicate(outcome)).count()
    }

    /// Applies one transition; returns whether the batch changed.
    pub(crate) fn apply(&mut self, generation: u64, name: &str, outcome: QueryOutcome) -> bool {
        if generation != self.generation {
            return false;
        }
        let Some(current) = self.outcomes.get_mut(name) else {
            return false;
        };
        if current.is_terminal() || outcome.stage() <= current.stage() {
            return false;
        }
        *current = outcome;
        true
    }
}
