use crate::domain::prediction::{
    canonical_ticker, KeyFactor, PredictionResult, Sentiment, Trend,
};
use serde_json::{Map, Value};

/// Lenient view over the model's JSON object. Every field is optional and
/// extracted individually; keys outside this set are never carried forward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmPredictionPayload {
    pub error: Option<String>,
    pub sentiment: Option<String>,
    pub trend: Option<String>,
    pub confidence_score: Option<f64>,
    pub summary: Option<String>,
    pub key_factors: Vec<LlmKeyFactor>,
    pub potential_risks: Vec<String>,
    pub recent_news_highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LlmKeyFactor {
    pub factor: String,
    pub impact: Option<String>,
}

impl LlmPredictionPayload {
    /// Returns `None` when the value is not a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        // `ticker` is ignored; the caller's ticker is authoritative.
        Some(Self {
            error: obj.get("error").and_then(declared_error),
            sentiment: str_field(obj, "sentiment"),
            trend: str_field(obj, "trend"),
            confidence_score: obj.get("confidence_score").and_then(Value::as_f64),
            summary: str_field(obj, "summary"),
            key_factors: obj
                .get("key_factors")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(LlmKeyFactor::from_value).collect())
                .unwrap_or_default(),
            potential_risks: string_list(obj, "potential_risks"),
            recent_news_highlights: string_list(obj, "recent_news_highlights"),
        })
    }

    pub fn is_declared_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn validate_and_into_result(mut self, ticker: &str) -> PredictionResult {
        match self.error.take() {
            Some(error) => self.into_declared_error(ticker, error),
            None => self.into_prediction(ticker),
        }
    }

    fn into_prediction(self, ticker: &str) -> PredictionResult {
        PredictionResult {
            ticker: canonical_ticker(ticker),
            sentiment: Sentiment::parse_or(self.sentiment.as_deref(), Sentiment::Neutral),
            trend: Trend::parse_or(self.trend.as_deref(), Trend::Unknown),
            confidence: self.confidence_score.unwrap_or(0.0),
            summary: self.summary.unwrap_or_default(),
            key_factors: into_key_factors(self.key_factors),
            risks: self.potential_risks,
            news_highlights: self.recent_news_highlights,
            sources: None,
            error_message: None,
        }
    }

    fn into_declared_error(self, ticker: &str, error: String) -> PredictionResult {
        PredictionResult {
            ticker: canonical_ticker(ticker),
            sentiment: Sentiment::parse_or(self.sentiment.as_deref(), Sentiment::Error),
            trend: Trend::parse_or(self.trend.as_deref(), Trend::Unknown),
            confidence: self.confidence_score.unwrap_or(0.0),
            summary: self
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| error.clone()),
            key_factors: into_key_factors(self.key_factors),
            risks: self.potential_risks,
            news_highlights: self.recent_news_highlights,
            sources: None,
            error_message: Some(error),
        }
    }
}

impl LlmKeyFactor {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let factor = match obj.get("factor") {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        };
        Some(Self {
            factor,
            impact: str_field(obj, "impact"),
        })
    }

    fn into_key_factor(self) -> KeyFactor {
        KeyFactor {
            factor: self.factor,
            impact: Sentiment::parse_or(self.impact.as_deref(), Sentiment::Neutral),
        }
    }
}

fn into_key_factors(items: Vec<LlmKeyFactor>) -> Vec<KeyFactor> {
    items.into_iter().map(LlmKeyFactor::into_key_factor).collect()
}

/// Any `error` other than `null`, `false` or `""` marks the reply as a failure.
fn declared_error(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(obj) => Some(
            obj.get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
        ),
        other => Some(other.to_string()),
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
