use crate::domain::prediction::{MSG_GENERIC_FAILURE, MSG_INVALID_API_KEY, MSG_PARSE_FAILED};
use crate::llm::Provider;
use serde_json::Value;
use std::fmt;

const JSON_PARSE_MARKERS: &[&str] = &["not valid JSON", "invalid JSON", "JSON parse"];
const INVALID_KEY_REASONS: &[&str] = &["API_KEY_INVALID", "API_KEY_NOT_FOUND"];

#[derive(Debug, Clone)]
pub struct LlmDiagnosticsError {
    pub provider: Provider,
    pub stage: &'static str,
    pub http_status: Option<u16>,
    /// Provider status string, e.g. `INVALID_ARGUMENT`.
    pub provider_status: Option<String>,
    /// Provider reason code from the error details, e.g. `API_KEY_INVALID`.
    pub reason: Option<String>,
    pub detail: String,
    pub raw_output: Option<String>,
    pub raw_response_json: Option<Value>,
}

impl fmt::Display for LlmDiagnosticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM error (provider={:?}, stage={}): {}",
            self.provider, self.stage, self.detail
        )
    }
}

impl std::error::Error for LlmDiagnosticsError {}

/// User-facing categories for a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ParseFailed,
    InvalidApiKey,
    Other,
}

impl FailureKind {
    pub fn message(self) -> &'static str {
        match self {
            Self::ParseFailed => MSG_PARSE_FAILED,
            Self::InvalidApiKey => MSG_INVALID_API_KEY,
            Self::Other => MSG_GENERIC_FAILURE,
        }
    }

    /// Structured fields win; message text is only consulted when the
    /// transport did not attach an `LlmDiagnosticsError`.
    pub fn classify(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(diag) = cause.downcast_ref::<LlmDiagnosticsError>() {
                return Self::from_diagnostics(diag);
            }
            if cause.is::<serde_json::Error>() {
                return Self::ParseFailed;
            }
        }
        Self::from_message(&format!("{err:#}"))
    }

    fn from_diagnostics(diag: &LlmDiagnosticsError) -> Self {
        if let Some(reason) = diag.reason.as_deref() {
            if INVALID_KEY_REASONS.contains(&reason) {
                return Self::InvalidApiKey;
            }
        }
        if matches!(diag.http_status, Some(401) | Some(403)) {
            return Self::InvalidApiKey;
        }
        if diag.stage == "decode" {
            return Self::ParseFailed;
        }
        Self::from_message(&diag.detail)
    }

    pub fn from_message(message: &str) -> Self {
        if JSON_PARSE_MARKERS.iter().any(|m| message.contains(m)) {
            return Self::ParseFailed;
        }
        if message.to_lowercase().contains("api key not valid") {
            return Self::InvalidApiKey;
        }
        Self::Other
    }
}
