//! Narrative synthesis adapter.
//!
//! Builds a prompt from a fixed persona preamble, the topic, and a context
//! block derived from the search references, then asks the text-generation
//! provider for a structured markdown analysis. The requested section layout
//! is stated in the prompt but never validated here — this adapter is a
//! best-effort text generator, not a validator; whatever the provider
//! returns flows through to the renderer as-is.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use trendlens_shared::{Result, SearchResult, TrendLensError};

/// At most this many references contribute to the context block.
const MAX_CONTEXT_REFERENCES: usize = 5;

/// Per-reference cap on the content excerpt, in characters.
const MAX_REFERENCE_CHARS: usize = 300;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Outcome of one synthesis call.
///
/// Keeps the three-way distinction between a usable answer, a response in
/// an unrecognized shape, and an outright transport failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisOutcome {
    /// Provider returned usable analysis text.
    Text(String),
    /// Call completed but the payload matched no recognized shape.
    UnrecognizedPayload,
    /// Transport failure or non-success status.
    Failed,
}

impl SynthesisOutcome {
    /// Collapse to the text, discarding the failure distinction.
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::UnrecognizedPayload | Self::Failed => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Chat response, tolerant of both recognized shapes: `choices` (shape A)
/// and a flat `result` string (shape B).
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the narrative synthesis provider.
pub struct SynthesisClient {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl SynthesisClient {
    /// Create a new narrative synthesis client.
    pub fn new(endpoint: Url, api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: crate::build_http_client()?,
            endpoint,
            api_key: api_key.into(),
        })
    }

    /// Generate the analysis for `topic`, using whatever search context is
    /// available. A missing or empty search result degrades the prompt to an
    /// empty context block; the call still proceeds.
    pub async fn synthesize(
        &self,
        topic: &str,
        search_result: Option<&SearchResult>,
    ) -> SynthesisOutcome {
        let prompt = build_prompt(topic, search_result);

        let raw = match self.request(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(topic, error = %e, "synthesis call failed");
                return SynthesisOutcome::Failed;
            }
        };

        match extract_text(&raw) {
            Some(text) => {
                debug!(topic, chars = text.len(), "analysis generated");
                SynthesisOutcome::Text(text)
            }
            None => {
                let preview: String = raw.chars().take(200).collect();
                warn!(topic, payload = %preview, "unrecognized synthesis payload");
                SynthesisOutcome::UnrecognizedPayload
            }
        }
    }

    async fn request(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "messages": [
                {"content": prompt, "role": "user"}
            ],
            "stream": false
        });

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| TrendLensError::Network(format!("synthesis: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrendLensError::Network(format!(
                "synthesis: HTTP {status}"
            )));
        }

        response
            .text()
            .await
            .map_err(|e| TrendLensError::Network(format!("synthesis body: {e}")))
    }
}

/// Try shape A (`choices[0].message.content`), then shape B (flat `result`).
fn extract_text(raw: &str) -> Option<String> {
    let parsed: ChatResponse = serde_json::from_str(raw).ok()?;

    if let Some(first) = parsed.choices.into_iter().next() {
        return Some(first.message.content);
    }
    parsed.result
}

// ---------------------------------------------------------------------------
// Prompt construction
// ---------------------------------------------------------------------------

/// Build the full prompt: persona preamble + topic + context block + the
/// requested markdown section contract.
fn build_prompt(topic: &str, search_result: Option<&SearchResult>) -> String {
    let context = build_context_block(search_result);

    format!(
        "你是一位高级产品经理和数据分析师。\n\
         请针对热搜话题 \"{topic}\" 进行深度分析。\n\
         \n\
         参考背景信息：\n\
         {context}\n\
         \n\
         请输出以下 Markdown 格式的内容（不要包含其他废话）：\n\
         \n\
         ## 背景来龙去脉\n\
         - **事件起因**: ...\n\
         - **事件发展**: ...\n\
         - **社会影响**: ...\n\
         \n\
         ## 深度分析\n\
         - **用户痛点**: ...\n\
         - **市场机会**: ...\n\
         - **创新方向**: ...\n\
         \n\
         ## 软件产品创意 (2个)\n\
         ### 创意 1: [产品名称]\n\
         - **类型**: (App/小程序/Web)\n\
         - **核心功能**: ...\n\
         - **目标用户**: ...\n\
         - **技术方案**: ...\n\
         \n\
         ### 创意 2: [产品名称]\n\
         - **类型**: ...\n\
         - **核心功能**: ...\n\
         - **目标用户**: ...\n\
         - **技术方案**: ...\n"
    )
}

/// Build the context block from at most the first few references, each
/// contributing its title and a capped content excerpt. `None` or an empty
/// reference list yields an empty block.
fn build_context_block(search_result: Option<&SearchResult>) -> String {
    let Some(result) = search_result else {
        return String::new();
    };

    result
        .references
        .iter()
        .take(MAX_CONTEXT_REFERENCES)
        .map(|r| {
            format!(
                "- 标题: {}\n  内容: {}",
                r.title,
                excerpt(&r.content, MAX_REFERENCE_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Truncate to approximately `max_chars` characters, char-boundary safe.
fn excerpt(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use trendlens_shared::Reference;
    use wiremock::matchers::{body_string_contains, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SynthesisClient {
        let endpoint = Url::parse(&server.uri()).unwrap();
        SynthesisClient::new(endpoint, "synth-key").unwrap()
    }

    fn sample_result(count: usize) -> SearchResult {
        SearchResult {
            references: (0..count)
                .map(|i| Reference {
                    title: format!("标题{i}"),
                    content: format!("内容{i}"),
                    snippet: None,
                    date: None,
                })
                .collect(),
        }
    }

    // --- Prompt construction ---

    #[test]
    fn prompt_with_null_context_still_builds() {
        let with_context = build_prompt("话题", Some(&sample_result(2)));
        let without_context = build_prompt("话题", None);

        // Both proceed; only the context block differs.
        assert!(with_context.contains("标题0"));
        assert!(!without_context.contains("标题0"));
        for p in [&with_context, &without_context] {
            assert!(p.contains("\"话题\""));
            assert!(p.contains("## 背景来龙去脉"));
            assert!(p.contains("## 深度分析"));
            assert!(p.contains("## 软件产品创意"));
        }
    }

    #[test]
    fn context_block_caps_reference_count() {
        let block = build_context_block(Some(&sample_result(8)));
        assert!(block.contains("标题4"));
        assert!(!block.contains("标题5"));
    }

    #[test]
    fn context_block_empty_list_matches_null() {
        let empty = build_context_block(Some(&sample_result(0)));
        let null = build_context_block(None);
        assert_eq!(empty, "");
        assert_eq!(empty, null);
    }

    #[test]
    fn excerpt_caps_multibyte_content() {
        let long = "热".repeat(400);
        let out = excerpt(&long, 300);
        assert_eq!(out.chars().count(), 303); // 300 + "..."
        assert!(out.ends_with("..."));

        assert_eq!(excerpt("短内容", 300), "短内容");
    }

    // --- Response shape parsing ---

    #[test]
    fn extract_text_shape_a() {
        let raw = r###"{"choices":[{"message":{"content":"## 背景\n分析文本"}}]}"###;
        assert_eq!(extract_text(raw).as_deref(), Some("## 背景\n分析文本"));
    }

    #[test]
    fn extract_text_shape_b() {
        let raw = r#"{"result":"扁平结果文本"}"#;
        assert_eq!(extract_text(raw).as_deref(), Some("扁平结果文本"));
    }

    #[test]
    fn extract_text_unrecognized() {
        assert!(extract_text(r#"{"request_id":"abc"}"#).is_none());
        assert!(extract_text("plain text, not json").is_none());
        assert!(extract_text(r#"{"choices":[]}"#).is_none());
    }

    // --- End-to-end against a mock provider ---

    #[tokio::test]
    async fn synthesize_returns_text_from_chat_shape() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "choices": [{"message": {"content": "## 背景来龙去脉\n- **事件起因**: 测试"}}]
        });
        Mock::given(method("POST"))
            .and(header("Authorization", "Bearer synth-key"))
            .and(body_string_contains("\"stream\":false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let outcome = client_for(&server).synthesize("话题", None).await;
        match outcome {
            SynthesisOutcome::Text(text) => assert!(text.starts_with("## 背景来龙去脉")),
            other => panic!("expected Text, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn synthesize_returns_text_from_flat_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"result": "扁平分析"})),
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server)
            .synthesize("话题", Some(&sample_result(1)))
            .await;
        assert_eq!(outcome, SynthesisOutcome::Text("扁平分析".into()));
    }

    #[tokio::test]
    async fn synthesize_distinguishes_unrecognized_from_failed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"error_code": 336}))
            )
            .mount(&server)
            .await;

        let outcome = client_for(&server).synthesize("话题", None).await;
        assert_eq!(outcome, SynthesisOutcome::UnrecognizedPayload);

        let failing = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&failing)
            .await;

        let outcome = client_for(&failing).synthesize("话题", None).await;
        assert_eq!(outcome, SynthesisOutcome::Failed);
        assert!(outcome.into_text().is_none());
    }
}
