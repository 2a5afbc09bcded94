use crate::config::Settings;
use crate::llm::error::LlmDiagnosticsError;
use crate::llm::sources::GroundingChunk;
use crate::llm::{GenerateRequest, ModelClient, ModelReply, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

// Fixed sampling parameters; not user-configurable.
const TEMPERATURE: f32 = 0.3;
const TOP_P: f32 = 0.9;
const TOP_K: u32 = 32;

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_gemini_api_key()?.to_string();
        let base_url = non_empty_or(std::env::var("GEMINI_BASE_URL").ok(), DEFAULT_BASE_URL);
        let model = non_empty_or(std::env::var("GEMINI_MODEL").ok(), DEFAULT_MODEL);

        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn generate_content(
        &self,
        req: &GenerateContentRequest,
    ) -> anyhow::Result<GenerateContentResponse> {
        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", HeaderValue::from_str(&self.api_key)?);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(req)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Gemini response body")?;
        if !status.is_success() {
            return Err(http_error(status, text).into());
        }

        serde_json::from_str::<GenerateContentResponse>(&text).map_err(|err| {
            LlmDiagnosticsError {
                provider: Provider::Gemini,
                stage: "decode",
                http_status: Some(status.as_u16()),
                provider_status: None,
                reason: None,
                detail: format!("failed to decode generateContent response: {err}"),
                raw_response_json: serde_json::from_str(&text).ok(),
                raw_output: Some(text),
            }
            .into()
        })
    }

    fn build_request(prompt: &str, grounding: bool) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
            },
            tools: grounding.then(|| {
                vec![Tool {
                    google_search: GoogleSearch {},
                }]
            }),
        }
    }

    fn into_reply(res: GenerateContentResponse) -> anyhow::Result<ModelReply> {
        let Some(candidate) = res.candidates.into_iter().next() else {
            let block_reason = res
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "unspecified".to_string());
            anyhow::bail!("Gemini returned no candidates (block_reason={block_reason})");
        };

        if let Some(reason) = candidate.finish_reason.as_deref() {
            if reason != "STOP" {
                tracing::warn!(finish_reason = reason, "Gemini candidate did not finish cleanly");
            }
        }

        let mut text = String::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if part.thought {
                continue;
            }
            if let Some(t) = part.text {
                text.push_str(&t);
            }
        }
        anyhow::ensure!(!text.trim().is_empty(), "Gemini response contained no text");

        Ok(ModelReply {
            text,
            grounding_chunks: candidate
                .grounding_metadata
                .map(|m| m.grounding_chunks)
                .unwrap_or_default(),
        })
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl ModelClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn generate(&self, request: GenerateRequest) -> anyhow::Result<ModelReply> {
        let req = Self::build_request(&request.prompt, request.grounding);
        let res = self.generate_content(&req).await?;
        Self::into_reply(res)
    }
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn http_error(status: StatusCode, text: String) -> LlmDiagnosticsError {
    let raw_response_json = serde_json::from_str::<serde_json::Value>(&text).ok();
    let body = raw_response_json
        .clone()
        .and_then(|v| serde_json::from_value::<ErrorEnvelope>(v).ok())
        .map(|e| e.error);

    let (detail, provider_status, reason) = match body {
        Some(body) => (
            body.message
                .unwrap_or_else(|| format!("status={status}")),
            body.status,
            body.details.into_iter().find_map(|d| d.reason),
        ),
        None => (format!("status={status}"), None, None),
    };

    LlmDiagnosticsError {
        provider: Provider::Gemini,
        stage: "http",
        http_status: Some(status.as_u16()),
        provider_status,
        reason,
        detail,
        raw_output: Some(text),
        raw_response_json,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Clone, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}
