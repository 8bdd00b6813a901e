//! Forensic web search over the Tavily search API.

use async_trait::async_trait;
use bioverify_core::{AdapterError, EvidenceSearch, EvidenceSource, SearchDepth, SearchQuery};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::http::{ensure_success, json_body, transport};

pub const DEFAULT_SEARCH_URL: &str = "https://api.tavily.com/search";

const TARGET: &str = "search";

pub struct TavilySearch {
    url: String,
    api_key: String,
    client: reqwest::Client,
}

impl TavilySearch {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            client,
        }
    }
}

/// Request body for one query.
pub fn request_body(api_key: &str, query: &SearchQuery) -> Value {
    let depth = match query.depth {
        SearchDepth::Basic => "basic",
        SearchDepth::Advanced => "advanced",
    };
    json!({
        "api_key": api_key,
        "query": query.query,
        "search_depth": depth,
        "max_results": query.max_results,
    })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    snippet: Option<String>,
}

impl From<SearchHit> for EvidenceSource {
    fn from(hit: SearchHit) -> Self {
        EvidenceSource {
            title: hit.title,
            url: hit.url,
            snippet: hit.content.or(hit.snippet).unwrap_or_default(),
        }
    }
}

/// Map a response body into evidence, capped at `max_results`.
pub fn parse_results(body: Value, max_results: u8) -> Result<Vec<EvidenceSource>, AdapterError> {
    let response: SearchResponse = serde_json::from_value(body).map_err(|e| AdapterError::Decode {
        target: TARGET.into(),
        message: e.to_string(),
    })?;
    Ok(response
        .results
        .into_iter()
        .take(max_results as usize)
        .map(EvidenceSource::from)
        .collect())
}

#[async_trait]
impl EvidenceSearch for TavilySearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<EvidenceSource>, AdapterError> {
        let response = self
            .client
            .post(&self.url)
            .json(&request_body(&self.api_key, query))
            .send()
            .await
            .map_err(|e| transport(TARGET, e))?;
        let body: Value = json_body(TARGET, ensure_success(TARGET, response)?).await?;
        let evidence = parse_results(body, query.max_results)?;
        debug!(hits = evidence.len(), "search complete");
        Ok(evidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let q = SearchQuery {
            query: "\"soil isolates\"".into(),
            depth: SearchDepth::Advanced,
            max_results: 5,
        };
        let body = request_body("tvly-key", &q);
        assert_eq!(body["api_key"], "tvly-key");
        assert_eq!(body["query"], "\"soil isolates\"");
        assert_eq!(body["search_depth"], "advanced");
        assert_eq!(body["max_results"], 5);
    }

    #[test]
    fn test_results_prefer_content_then_snippet() {
        let body = json!({"results": [
            {"title": "A", "url": "https://a.example", "content": "from content", "snippet": "ignored"},
            {"title": "B", "url": "https://b.example", "snippet": "from snippet"},
            {"title": "C", "url": "https://c.example"}
        ]});
        let hits = parse_results(body, 5).unwrap();
        assert_eq!(hits[0].snippet, "from content");
        assert_eq!(hits[1].snippet, "from snippet");
        assert_eq!(hits[2].snippet, "");
    }

    #[test]
    fn test_missing_results_is_empty_and_extra_hits_are_dropped() {
        assert!(parse_results(json!({}), 5).unwrap().is_empty());
        let many: Vec<Value> = (0..8)
            .map(|i| json!({"title": format!("t{i}"), "url": "u"}))
            .collect();
        assert_eq!(parse_results(json!({"results": many}), 5).unwrap().len(), 5);
    }

    #[test]
    fn test_non_object_body_is_decode_error() {
        assert!(matches!(
            parse_results(json!("nope"), 5),
            Err(AdapterError::Decode { .. })
        ));
    }
}
