use serde::{Deserialize, Serialize};

pub const MSG_API_KEY_MISSING: &str = "API Key is not configured.";
pub const MSG_API_KEY_MISSING_SUMMARY: &str =
    "API Key is not configured. Please set the API_KEY environment variable.";
pub const MSG_PARSE_FAILED: &str =
    "Failed to parse prediction data from the model. The format might be incorrect.";
pub const MSG_INVALID_API_KEY: &str =
    "Invalid API Key. Please check your API_KEY environment variable.";
pub const MSG_GENERIC_FAILURE: &str =
    "Failed to get prediction. The model might be unavailable or returned an unexpected format.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Error,
}

impl Sentiment {
    /// Exact, case-sensitive match against the variant names the prompt advertises.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Positive" => Some(Self::Positive),
            "Negative" => Some(Self::Negative),
            "Neutral" => Some(Self::Neutral),
            "Error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn parse_or(s: Option<&str>, default: Self) -> Self {
        s.and_then(Self::parse).unwrap_or(default)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Error => "Error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Stable,
    Unknown,
}

impl Trend {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Up" => Some(Self::Up),
            "Down" => Some(Self::Down),
            "Stable" => Some(Self::Stable),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn parse_or(s: Option<&str>, default: Self) -> Self {
        s.and_then(Self::parse).unwrap_or(default)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Stable => "Stable",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFactor {
    pub factor: String,
    pub impact: Sentiment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: String,
}

/// Canonical, UI-safe prediction record. Always fully populated; a failure is
/// signalled by `error_message` being set, never by missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub ticker: String,
    pub sentiment: Sentiment,
    pub trend: Trend,
    pub confidence: f64,
    pub summary: String,
    pub key_factors: Vec<KeyFactor>,
    pub risks: Vec<String>,
    pub news_highlights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<GroundingSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PredictionResult {
    /// Failure record with every optional field at its default.
    pub fn failure(ticker: &str, summary: &str, error_message: &str) -> Self {
        Self {
            ticker: canonical_ticker(ticker),
            sentiment: Sentiment::Error,
            trend: Trend::Unknown,
            confidence: 0.0,
            summary: summary.to_string(),
            key_factors: Vec::new(),
            risks: Vec::new(),
            news_highlights: Vec::new(),
            sources: None,
            error_message: Some(error_message.to_string()),
        }
    }

    pub fn missing_api_key(ticker: &str) -> Self {
        Self::failure(ticker, MSG_API_KEY_MISSING_SUMMARY, MSG_API_KEY_MISSING)
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn with_sources(mut self, sources: Vec<GroundingSource>) -> Self {
        self.sources = Some(sources);
        self
    }
}

pub fn canonical_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_exact_names_only() {
        assert_eq!(Sentiment::parse("Positive"), Some(Sentiment::Positive));
        assert_eq!(Sentiment::parse("positive"), None);
        assert_eq!(Sentiment::parse("Bullish"), None);
        assert_eq!(Trend::parse("Stable"), Some(Trend::Stable));
        assert_eq!(Trend::parse("Sideways"), None);
    }

    #[test]
    fn parse_or_falls_back_on_absent_or_unknown() {
        assert_eq!(Sentiment::parse_or(None, Sentiment::Neutral), Sentiment::Neutral);
        assert_eq!(
            Sentiment::parse_or(Some("Meh"), Sentiment::Error),
            Sentiment::Error
        );
        assert_eq!(Trend::parse_or(Some("Down"), Trend::Unknown), Trend::Down);
        assert_eq!(Trend::parse_or(Some(""), Trend::Unknown), Trend::Unknown);
    }

    #[test]
    fn as_str_matches_parse() {
        for s in [
            Sentiment::Positive,
            Sentiment::Negative,
            Sentiment::Neutral,
            Sentiment::Error,
        ] {
            assert_eq!(Sentiment::parse(s.as_str()), Some(s));
        }
        for t in [Trend::Up, Trend::Down, Trend::Stable, Trend::Unknown] {
            assert_eq!(Trend::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn failure_is_a_total_record() {
        let r = PredictionResult::failure(" msft ", "summary", "boom");
        assert_eq!(r.ticker, "MSFT");
        assert_eq!(r.sentiment, Sentiment::Error);
        assert_eq!(r.trend, Trend::Unknown);
        assert_eq!(r.confidence, 0.0);
        assert!(r.key_factors.is_empty() && r.risks.is_empty() && r.news_highlights.is_empty());
        assert_eq!(r.error_message.as_deref(), Some("boom"));
        assert!(r.is_error());
    }

    #[test]
    fn serializes_without_absent_optionals() {
        let r = PredictionResult::missing_api_key("aapl");
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["ticker"], "AAPL");
        assert_eq!(v["sentiment"], "Error");
        assert_eq!(v["error_message"], MSG_API_KEY_MISSING);
        assert!(v.get("sources").is_none());
    }
}
