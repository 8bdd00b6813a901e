//! Structured pass/fail verdicts from the Gemini `generateContent` API.
//!
//! The request pins a JSON response schema; the returned text is parsed as
//! JSON and handed back unvalidated, so the workflow applies the verdict
//! contract itself.

use std::sync::OnceLock;

use async_trait::async_trait;
use bioverify_core::{AdapterError, StructuredVerdict, VerdictRequest};
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use crate::http::{ensure_success, json_body, transport};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const TARGET: &str = "verdict model";

pub struct GeminiVerdict {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiVerdict {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
            client,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// The `generateContent` request for a verdict.
pub fn request_body(request: &VerdictRequest) -> Value {
    let user_text = format!(
        "ABSTRACT TO AUDIT:\n{}\n\nWEB SEARCH RESULTS (JSON):\n{}",
        request.abstract_text, request.evidence_json
    );
    json!({
        "systemInstruction": {"parts": [{"text": request.system_instructions}]},
        "contents": [{"role": "user", "parts": [{"text": user_text}]}],
        "generationConfig": {
            "temperature": 0,
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "decision": {"type": "STRING", "enum": ["pass", "fail"]},
                    "reason": {"type": "STRING"}
                },
                "required": ["decision", "reason"]
            }
        }
    })
}

fn fence_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").ok())
        .as_ref()
}

/// Strip a surrounding Markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    fence_pattern()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map_or(text.trim(), |m| m.as_str())
}

/// Extract the model's JSON answer from a `generateContent` response.
pub fn parse_response(body: &Value) -> Result<Value, AdapterError> {
    let text = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| AdapterError::ContractViolation("model returned no text candidate".into()))?;

    serde_json::from_str(strip_code_fence(text))
        .map_err(|e| AdapterError::ContractViolation(format!("model output is not JSON: {e}")))
}

#[async_trait]
impl StructuredVerdict for GeminiVerdict {
    async fn judge(&self, request: &VerdictRequest) -> Result<Value, AdapterError> {
        debug!(model = %self.model, "requesting verdict");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| transport(TARGET, e))?;
        let body: Value = json_body(TARGET, ensure_success(TARGET, response)?).await?;
        parse_response(&body)
    }
}
