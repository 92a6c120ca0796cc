//! Google Gemini provider implementation

use super::types::{LlmRequest, LlmResponse, Usage};
use super::{LlmService, ServiceError};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DIRECT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiModel {
    Gemini15Flash,
    Gemini15Pro,
    Gemini20Flash,
}

impl GeminiModel {
    pub fn api_name(self) -> &'static str {
        match self {
            GeminiModel::Gemini15Flash => "gemini-1.5-flash",
            GeminiModel::Gemini15Pro => "gemini-1.5-pro",
            GeminiModel::Gemini20Flash => "gemini-2.0-flash",
        }
    }
}

/// Gemini service implementation
pub struct GeminiService {
    client: Client,
    /// `None` in gateway mode
    api_key: Option<String>,
    url: String,
    model_id: String,
}

impl GeminiService {
    pub fn new(
        api_key: String,
        model: GeminiModel,
        gateway: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let url = match gateway {
            Some(gw) => format!(
                "{}/gemini/v1beta/models/{}:generateContent",
                gw.trim_end_matches('/'),
                model.api_name()
            ),
            None => format!(
                "{DIRECT_BASE_URL}/v1beta/models/{}:generateContent",
                model.api_name()
            ),
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::unknown(format!("Failed to create HTTP client: {e}")))?;

        // Gateway mode - the gateway authenticates
        let api_key = (!api_key.starts_with("implicit")).then_some(api_key);

        Ok(Self {
            client,
            api_key,
            url,
            model_id: model.api_name().to_string(),
        })
    }

    /// The key travels in a header so it never appears in URLs or their errors
    fn build_request(&self, body: &GeminiRequest) -> RequestBuilder {
        let builder = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(body);
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    fn translate_request(request: &LlmRequest) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(request.prompt.clone()),
                }],
            }],
        }
    }

    fn normalize_response(resp: GeminiResponse) -> Result<LlmResponse, ServiceError> {
        if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ServiceError::malformed(format!("Prompt blocked: {reason}")));
        }

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::malformed("No candidates in response"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ServiceError::malformed(format!(
                "Empty reply (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("none")
            )));
        }

        let usage = resp
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u64::from(u.prompt_token_count),
                output_tokens: u64::from(u.candidates_token_count),
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            text,
            finish_reason: candidate.finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LlmService for GeminiService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError> {
        let gemini_request = Self::translate_request(request);

        let response = self
            .build_request(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                if e.is_timeout() {
                    ServiceError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ServiceError::network(format!("Connection failed: {e}"))
                } else {
                    ServiceError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                ServiceError::network(format!("Failed to read response: {}", e.without_url()))
            })?;

        if !status.is_success() {
            let message = serde_json::from_str::<GeminiErrorResponse>(&body)
                .map_or(body, |error_resp| error_resp.error.message);
            return Err(ServiceError::from_status(status.as_u16(), message));
        }

        let gemini_response: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| ServiceError::malformed(format!("Failed to parse response: {e}")))?;

        Self::normalize_response(gemini_response)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}
