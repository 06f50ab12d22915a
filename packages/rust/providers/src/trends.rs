//! Trend source adapter.
//!
//! Fetches the ranked hot-topic list via HTTP GET with an API-key query
//! parameter. Fails soft: a provider outage degrades the pipeline to
//! "no topics" instead of crashing the run.

use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use trendlens_shared::{Popularity, Result, TrendItem, TrendLensError};

/// Status code the provider uses to signal a successful response.
const PROVIDER_OK: i64 = 200;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TrendResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    result: Option<TrendResultBody>,
}

#[derive(Debug, Deserialize)]
struct TrendResultBody {
    #[serde(default)]
    list: Vec<TrendEntry>,
}

#[derive(Debug, Deserialize)]
struct TrendEntry {
    #[serde(default)]
    hotword: String,
    #[serde(default, deserialize_with = "lenient_popularity")]
    hotwordnum: Option<Popularity>,
}

/// Tolerate whatever JSON the provider puts in `hotwordnum`: integers and
/// strings map directly, non-integer numbers keep their text form, anything
/// else drops to absent rather than failing the whole list.
fn lenient_popularity<'de, D>(deserializer: D) -> std::result::Result<Option<Popularity>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Popularity::Number(i),
            None => Popularity::Text(n.to_string()),
        }),
        serde_json::Value::String(s) => Some(Popularity::Text(s)),
        _ => None,
    }))
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the ranked hot-topic list provider.
pub struct TrendClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl TrendClient {
    /// Create a new trend source client.
    pub fn new(endpoint: Url, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: crate::build_http_client()?,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Fetch the ranked trend list.
    ///
    /// Returns an empty list on transport failure, non-success status, or
    /// malformed payload, with a diagnostic — never an error.
    pub async fn fetch_trends(&self) -> Vec<TrendItem> {
        match self.fetch_inner().await {
            Ok(items) => {
                debug!(count = items.len(), "trend list fetched");
                items
            }
            Err(e) => {
                warn!(error = %e, "trend fetch failed, continuing with empty list");
                Vec::new()
            }
        }
    }

    async fn fetch_inner(&self) -> Result<Vec<TrendItem>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| TrendLensError::Network(format!("trend source: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrendLensError::Network(format!(
                "trend source: HTTP {status}"
            )));
        }

        let body: TrendResponse = response
            .json()
            .await
            .map_err(|e| TrendLensError::Network(format!("trend source payload: {e}")))?;

        if body.code != PROVIDER_OK {
            return Err(TrendLensError::Network(format!(
                "trend source: provider code {} ({})",
                body.code, body.msg
            )));
        }

        let items = body
            .result
            .map(|r| r.list)
            .unwrap_or_default()
            .into_iter()
            .map(|entry| TrendItem {
                topic: entry.hotword,
                popularity: entry.hotwordnum.unwrap_or(Popularity::Number(0)),
            })
            .collect();

        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
