//! Gemini HTTP client for the completion boundary.
//!
//! Blocking client against the `generateContent` endpoint. Status codes map
//! onto the `CompletionError` taxonomy so the executor's retry/skip policy
//! stays provider-agnostic.

use serde::{Deserialize, Serialize};

use crate::completion::{CompletionClient, CompletionError, CompletionRequest, CompletionResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP client for the Gemini API.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a client with an explicit base URL and request timeout.
    pub fn new(base_url: &str, api_key: String, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs,
        }
    }

    /// Default endpoint with a 5-minute timeout.
    pub fn with_api_key(api_key: String) -> Self {
        Self::new(DEFAULT_BASE_URL, api_key, 300)
    }
}

// ── Wire types ──────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: ContentBlock<'a>,
    contents: Vec<ContentBlock<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct ContentBlock<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Map a non-success HTTP status onto the completion error taxonomy.
fn classify_status(status: u16, body: String) -> CompletionError {
    match status {
        429 => CompletionError::RateLimited,
        401 | 403 => CompletionError::Auth(body),
        _ => CompletionError::Http { status, body },
    }
}

impl CompletionClient for GeminiClient {
    fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionResponse, CompletionError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, request.model, self.api_key
        );

        let body = GenerateContentRequest {
            system_instruction: ContentBlock {
                parts: vec![Part {
                    text: request.system,
                }],
            },
            contents: vec![ContentBlock {
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
                response_mime_type: request.json_output.then_some("application/json"),
            },
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout(self.timeout_secs)
            } else {
                CompletionError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| CompletionError::Transport(format!("Undecodable response body: {e}")))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = parsed.usage_metadata.unwrap_or_default();

        Ok(CompletionResponse {
            text,
            prompt_tokens: usage.prompt_token_count,
            completion_tokens: usage.candidates_token_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_429_maps_to_rate_limited() {
        assert!(matches!(
            classify_status(429, String::new()),
            CompletionError::RateLimited
        ));
    }

    #[test]
    fn auth_statuses_map_to_auth() {
        assert!(matches!(
            classify_status(401, "key expired".into()),
            CompletionError::Auth(_)
        ));
        assert!(matches!(
            classify_status(403, String::new()),
            CompletionError::Auth(_)
        ));
    }

    #[test]
    fn other_statuses_map_to_http() {
        let err = classify_status(500, "internal".into());
        match err {
            CompletionError::Http { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal");
            }
            other => panic!("Expected Http, got {other:?}"),
        }
    }

    #[test]
    fn request_body_serializes_json_mode() {
        let body = GenerateContentRequest {
            system_instruction: ContentBlock {
                parts: vec![Part { text: "system" }],
            },
            contents: vec![ContentBlock {
                parts: vec![Part { text: "prompt" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: Some("application/json"),
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"systemInstruction\""));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
        assert!(json.contains("\"temperature\":0.2"));
    }

    #[test]
    fn response_parses_text_and_usage() {
        let raw = r#"{
            "candidates": [{"content": {"parts": [{"text": "{\"ok\":true}"}]}}],
            "usageMetadata": {"promptTokenCount": 100, "candidatesTokenCount": 40}
        }"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.candidates.len(), 1);
        let usage = parsed.usage_metadata.unwrap();
        assert_eq!(usage.prompt_token_count, 100);
        assert_eq!(usage.candidates_token_count, 40);
    }

    #[test]
    fn response_tolerates_missing_usage() {
        let raw = r#"{"candidates": []}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.usage_metadata.is_none());
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = GeminiClient::new("https://example.test/v1/", "k".into(), 30);
        assert_eq!(client.base_url, "https://example.test/v1");
    }
}
