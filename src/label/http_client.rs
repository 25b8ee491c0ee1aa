//! HTTP client construction policy for label search.
//!
//! Centralizes networking defaults (timeouts, user-agent, compression, proxy
//! compatibility) so every search client is built the same way.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::{Client, ClientBuilder, Proxy};
use tracing::warn;

use super::SearchError;

/// Builds the search HTTP client.
///
/// # Errors
///
/// Returns [`SearchError::Transport`] when client construction fails.
pub(crate) fn build_search_http_client(
    user_agent: &str,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, SearchError> {
    let settings = ClientSettings {
        user_agent: user_agent.to_string(),
        connect_timeout,
        read_timeout,
    };

    match try_build_client(&settings, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some restricted sandbox environments panic when querying system
            // proxy settings; retry with env-only proxy discovery.
            warn!("Search client hit system proxy panic; using env-proxy fallback builder");
            match try_build_client(&settings, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(SearchError::transport(
                    "HTTP client construction panicked while initializing label search networking",
                )),
                Err(BuildClientFailure::Build(error)) => Err(SearchError::transport(format!(
                    "HTTP client construction failed: {error}"
                ))),
            }
        }
        Err(BuildClientFailure::Build(error)) => Err(SearchError::transport(format!(
            "HTTP client construction failed: {error}"
        ))),
    }
}

#[derive(Debug, Clone)]
struct ClientSettings {
    user_agent: String,
    connect_timeout: Duration,
    read_timeout: Duration,
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    settings: &ClientSettings,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let settings = settings.clone();
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(&settings);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(settings: &ClientSettings) -> ClientBuilder {
    Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.read_timeout)
        .user_agent(settings.user_agent.clone())
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
