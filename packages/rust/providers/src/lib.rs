//! HTTP adapters for the external providers TrendLens talks to.
//!
//! This crate provides:
//! - [`TrendClient`] — fetches the ranked hot-topic list
//! - [`SearchClient`] — retrieves background references for a topic
//! - [`SynthesisClient`] — generates the narrative analysis for a topic
//!
//! All three adapters recover provider failures locally: transport errors,
//! non-success statuses, and malformed payloads are logged and surfaced as
//! empty/absent results, never as errors across the orchestrator boundary.

pub mod search;
pub mod synthesis;
pub mod trends;

pub use search::SearchClient;
pub use synthesis::{SynthesisClient, SynthesisOutcome};
pub use trends::TrendClient;

use std::time::Duration;

use trendlens_shared::{Result, TrendLensError};

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("TrendLens/", env!("CARGO_PKG_VERSION"));

/// Per-call transport timeout. Providers either answer or fail within this
/// window; the orchestrator imposes no additional deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared reqwest client used by all adapters.
pub(crate) fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| TrendLensError::Network(format!("failed to build HTTP client: {e}")))
}
