//! Label records and search response wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One label document as returned by the search API.
///
/// The record is kept as an arbitrary JSON tree; the engine only reads the
/// `openfda.substance_name` and `openfda.brand_name` lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelRecord(Value);

impl LabelRecord {
    /// Wraps an existing JSON value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// String entries of `openfda.substance_name`, empty when absent.
    ///
    /// Entries that are not strings are skipped; use
    /// [`substance_count`](Self::substance_count) for the listed count.
    #[must_use]
    pub fn substance_names(&self) -> Vec<&str> {
        self.openfda_list("substance_name")
    }

    /// Number of entries in `openfda.substance_name`, whatever their type.
    #[must_use]
    pub fn substance_count(&self) -> usize {
        self.openfda_array("substance_name").map_or(0, Vec::len)
    }

    /// Entries of `openfda.brand_name`, empty when absent.
    #[must_use]
    pub fn brand_names(&self) -> Vec<&str> {
        self.openfda_list("brand_name")
    }

    fn openfda_list(&self, key: &str) -> Vec<&str> {
        self.openfda_array(key)
            .map(|entries| entries.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    fn openfda_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.0
            .get("openfda")
            .and_then(|openfda| openfda.get(key))
            .and_then(Value::as_array)
    }
}

impl From<Value> for LabelRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// One window of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    /// Records in API document order
    pub records: Vec<LabelRecord>,
    /// Total matches reported by the API across all windows
    pub total: u64,
}

impl SearchPage {
    #[must_use]
    pub fn new(records: Vec<LabelRecord>, total: u64) -> Self {
        Self { records, total }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ==================== Wire Types ====================

/// Top-level search response body.
#[derive(Debug, Deserialize)]
pub(crate) struct LabelResponse {
    pub meta: Option<ResponseMeta>,
    pub results: Option<Vec<LabelRecord>>,
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseMeta {
    pub results: Option<ResultsMeta>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsMeta {
    pub total: Option<u64>,
}

/// Body-level error object.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[allow(dead_code)] // Deserialized for Debug output; useful for troubleshooting API responses
    pub code: Option<String>,
    pub message: Option<String>,
}

impl LabelResponse {
    /// Reported total, falling back to the number of returned records.
    pub(crate) fn total(&self) -> Option<u64> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.results.as_ref())
            .and_then(|results| results.total)
    }
}
