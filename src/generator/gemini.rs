use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ExtractionCallError, generator::Generator};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    agent: ureq::Agent,
    api_key: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>, timeout: Duration) -> Self {
        let cfg = ureq::Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(10)))
            .timeout_global(Some(timeout))
            .build();
        GeminiClient {
            agent: ureq::Agent::new_with_config(cfg),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/models/{}:generateContent", self.model)
    }
}

impl Generator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ExtractionCallError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ExtractionCallError::MissingApiKey)?;
        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
        };
        let endpoint = self.endpoint();
        let mut res = self
            .agent
            .post(&endpoint)
            .header("x-goog-api-key", key)
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::StatusCode(status) => ExtractionCallError::Status { status },
                other => ExtractionCallError::Transport(other.to_string()),
            })?;
        let parsed: GenerateResponse = res
            .body_mut()
            .read_json()
            .map_err(|e| ExtractionCallError::Decode(e.to_string()))?;
        response_text(parsed)
    }
}

fn response_text(res: GenerateResponse) -> Result<String, ExtractionCallError> {
    let Some(candidate) = res.candidates.into_iter().next() else {
        let reason = res
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!("prompt blocked: {r}"))
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(ExtractionCallError::EmptyResponse(reason));
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "empty content".to_string());
        return Err(ExtractionCallError::EmptyResponse(reason));
    }
    debug!(chars = text.len(), "model responded");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Result<String, ExtractionCallError> {
        response_text(serde_json::from_str(raw).expect("valid response json"))
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"[{\"name\":"},{"text":"\"Crop Over\"}]"}],"role":"model"},"finishReason":"STOP"},{"content":{"parts":[{"text":"ignored"}]}}]}"#;
        assert_eq!(decode(raw).unwrap(), r#"[{"name":"Crop Over"}]"#);
    }

    #[test]
    fn blocked_prompt_is_an_error() {
        let raw = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        assert_eq!(
            decode(raw),
            Err(ExtractionCallError::EmptyResponse("prompt blocked: SAFETY".to_string()))
        );
    }

    #[test]
    fn empty_candidate_reports_finish_reason() {
        let raw = r#"{"candidates":[{"finishReason":"MAX_TOKENS"}]}"#;
        assert_eq!(
            decode(raw),
            Err(ExtractionCallError::EmptyResponse("MAX_TOKENS".to_string()))
        );
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(Some("   ".to_string()), DEFAULT_MODEL, Duration::from_secs(1));
        assert_eq!(client.generate("hi"), Err(ExtractionCallError::MissingApiKey));
    }

    #[test]
    fn endpoint_names_the_model() {
        let client = GeminiClient::new(None, "gemini-test", Duration::from_secs(1));
        assert!(client.endpoint().ends_with("/models/gemini-test:generateContent"));
    }
}
