//! Context search adapter.
//!
//! Wraps the topic in a fixed natural-language query asking for background,
//! timeline, and impact, and POSTs it to the search provider as a
//! single-message chat payload. This is the per-topic call that dominates
//! run latency and cost; callers must treat it as independently failable.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use trendlens_shared::{Reference, Result, SearchResult, TrendLensError};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    /// Absent when the provider had nothing usable; an explicit empty list
    /// is kept distinct from absence.
    references: Option<Vec<Reference>>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the context search provider.
pub struct SearchClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl SearchClient {
    /// Create a new context search client.
    pub fn new(endpoint: Url, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: crate::build_http_client()?,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Search for background references on `topic`.
    ///
    /// Returns `None` on transport failure, non-success status, or a payload
    /// without a `references` field. A payload carrying an explicit empty
    /// list returns `Some` with zero references.
    pub async fn search(&self, topic: &str) -> Option<SearchResult> {
        match self.search_inner(topic).await {
            Ok(Some(result)) => {
                debug!(topic, references = result.references.len(), "search complete");
                Some(result)
            }
            Ok(None) => {
                debug!(topic, "search returned no references field");
                None
            }
            Err(e) => {
                warn!(topic, error = %e, "search failed");
                None
            }
        }
    }

    async fn search_inner(&self, topic: &str) -> Result<Option<SearchResult>> {
        let query = build_query(topic);
        let body = json!({
            "messages": [
                {"content": query, "role": "user"}
            ]
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(
                "X-Appbuilder-Authorization",
                format!("Bearer {}", self.api_key),
            )
            .json(&body)
            .send()
            .await
            .map_err(|e| TrendLensError::Network(format!("search: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrendLensError::Network(format!("search: HTTP {status}")));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| TrendLensError::Network(format!("search payload: {e}")))?;

        Ok(parsed
            .references
            .map(|references| SearchResult { references }))
    }
}

/// Fixed query template asking for background, timeline, and impact.
fn build_query(topic: &str) -> String {
    format!("详细搜索：{topic}，提供事件的完整背景、时间线和影响")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
