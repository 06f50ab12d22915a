//! Core domain types for the TrendLens enrichment pipeline.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Popularity
// ---------------------------------------------------------------------------

/// Popularity metric attached to a trending topic.
///
/// Hot-list providers are inconsistent: some return a bare number, others a
/// pre-formatted string (possibly with leading whitespace or thousands
/// separators). The value is carried through the pipeline unmodified and
/// only trimmed for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Popularity {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for Popularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

// ---------------------------------------------------------------------------
// TrendItem
// ---------------------------------------------------------------------------

/// A ranked topic with its popularity metric, as returned by the trend source.
///
/// Immutable once fetched; ordering is the provider's rank order and is
/// preserved through every downstream stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendItem {
    pub topic: String,
    pub popularity: Popularity,
}

// ---------------------------------------------------------------------------
// Reference / SearchResult
// ---------------------------------------------------------------------------

/// A single reference snippet returned by the context search provider.
///
/// Duplicates from the provider are passed through unmodified — there is no
/// uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// The bundle of reference snippets retrieved for one topic.
///
/// `Some(SearchResult { references: vec![] })` means the provider answered
/// with an explicit empty list; `None` at the call site means the provider
/// failed or returned no usable payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub references: Vec<Reference>,
}

// ---------------------------------------------------------------------------
// EnrichedRecord / Snapshot
// ---------------------------------------------------------------------------

/// A topic combined with its search context and synthesized analysis.
///
/// Created by the orchestrator for each retained trend item; `search_result`
/// and `analysis` are `None` when the corresponding provider call failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub topic: String,
    pub popularity: Popularity,
    pub search_result: Option<SearchResult>,
    pub analysis: Option<String>,
}

/// The full ordered set of enriched records for one pipeline run.
///
/// Serialized as a plain JSON array — no version field, schema is
/// positional. Invariant: order equals the rank order of the retained,
/// non-skipped trend items.
pub type Snapshot = Vec<EnrichedRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn popularity_accepts_number_and_string() {
        let n: Popularity = serde_json::from_str("778179").expect("number");
        assert_eq!(n, Popularity::Number(778179));

        let s: Popularity = serde_json::from_str("\" 1200000\"").expect("string");
        assert_eq!(s, Popularity::Text(" 1200000".into()));
    }

    #[test]
    fn popularity_display_trims_text() {
        assert_eq!(Popularity::Number(100).to_string(), "100");
        assert_eq!(Popularity::Text(" 1,076,529".into()).to_string(), "1,076,529");
    }

    #[test]
    fn reference_optional_fields_default() {
        let json = r#"{"title":"t","content":"c"}"#;
        let r: Reference = serde_json::from_str(json).expect("deserialize");
        assert!(r.snippet.is_none());
        assert!(r.date.is_none());

        // Absent optionals are not serialized back out.
        let out = serde_json::to_string(&r).expect("serialize");
        assert!(!out.contains("snippet"));
        assert!(!out.contains("date"));
    }

    #[test]
    fn snapshot_roundtrip_preserves_order() {
        let snapshot: Snapshot = vec![
            EnrichedRecord {
                topic: "第一".into(),
                popularity: Popularity::Number(300),
                search_result: None,
                analysis: Some("## 背景".into()),
            },
            EnrichedRecord {
                topic: "第二".into(),
                popularity: Popularity::Text("2000".into()),
                search_result: Some(SearchResult { references: vec![] }),
                analysis: None,
            },
        ];

        let json = serde_json::to_string_pretty(&snapshot).expect("serialize");
        assert!(json.trim_start().starts_with('['), "snapshot is a bare array");

        let parsed: Snapshot = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, snapshot);
        assert_eq!(parsed[0].topic, "第一");
        assert_eq!(parsed[1].topic, "第二");
    }

    #[test]
    fn empty_reference_list_is_distinct_from_null() {
        let with_empty = EnrichedRecord {
            topic: "x".into(),
            popularity: Popularity::Number(1),
            search_result: Some(SearchResult { references: vec![] }),
            analysis: None,
        };
        let with_null = EnrichedRecord {
            search_result: None,
            ..with_empty.clone()
        };

        let a = serde_json::to_string(&with_empty).expect("serialize");
        let b = serde_json::to_string(&with_null).expect("serialize");
        assert!(a.contains(r#""references":[]"#));
        assert!(b.contains(r#""search_result":null"#));
    }
}
