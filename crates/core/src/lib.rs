pub mod domain;
pub mod llm;
pub mod service;

pub use domain::prediction::{KeyFactor, PredictionResult, Sentiment, Trend};

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub grounding_enabled: bool,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let gemini_api_key =
                non_empty_var("GEMINI_API_KEY").or_else(|| non_empty_var("API_KEY"));

            let grounding_enabled = match non_empty_var("GEMINI_GROUNDING") {
                Some(v) => parse_flag(&v).with_context(|| {
                    format!("GEMINI_GROUNDING must be a boolean flag (got {v})")
                })?,
                None => false,
            };

            Ok(Self {
                gemini_api_key,
                grounding_enabled,
                sentry_dsn: non_empty_var("SENTRY_DSN"),
            })
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .context("API_KEY (or GEMINI_API_KEY) is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    fn parse_flag(v: &str) -> Option<bool> {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

}
