// crates/rbac-conformance-clients/src/http.rs
// ============================================================================
// Module: HTTP Plumbing
// Description: Shared client construction and URL helpers.
// Purpose: Keep timeouts, headers, and path escaping identical across clients.
// Dependencies: reqwest, url
// ============================================================================

//! ## Overview
//! Both service clients build their [`reqwest::Client`] from [`HttpSettings`]
//! and join escaped path segments onto a configured endpoint with
//! [`endpoint_url`]. Error bodies are truncated before they reach reports.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::Client;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the caller's token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
/// Maximum characters of a response body kept in errors.
pub const MAX_ERROR_BODY_CHARS: usize = 512;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Client timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpSettings {
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub request_timeout: Duration,
}

impl HttpSettings {
    /// Builds settings from millisecond values.
    #[must_use]
    pub const fn from_millis(connect_timeout_ms: u64, request_timeout_ms: u64) -> Self {
        Self {
            connect_timeout: Duration::from_millis(connect_timeout_ms),
            request_timeout: Duration::from_millis(request_timeout_ms),
        }
    }

    /// Builds a client with these timeouts.
    pub(crate) fn build_client(self) -> Result<Client, String> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .build()
            .map_err(|err| err.to_string())
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self::from_millis(5_000, 60_000)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Appends escaped segments and query pairs to `base`.
pub(crate) fn endpoint_url<S: AsRef<str>>(
    base: &Url,
    segments: &[S],
    query: &[(S, S)],
) -> Result<Url, String> {
    let mut url = base.clone();
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| format!("endpoint cannot carry a path: {base}"))?;
        path.pop_if_empty();
        path.extend(segments.iter().map(AsRef::as_ref));
    }
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key.as_ref(), value.as_ref());
        }
    }
    Ok(url)
}

/// Truncates response text for error messages.
pub(crate) fn truncate_body(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY_CHARS {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
    truncated.push_str("...");
    truncated
}
