//! Shared User-Agent string for label search traffic.

/// Project URL for User-Agent identification (good citizenship; RFC 9308).
const PROJECT_UA_URL: &str = "https://github.com/fierce/label-query";

/// Default User-Agent for label search requests.
#[must_use]
pub(crate) fn default_search_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("label-query/{version} (label-lookup-tool; +{PROJECT_UA_URL})")
}
