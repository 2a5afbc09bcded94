use crate::domain::contract::LlmPredictionPayload;
use crate::domain::prediction::{PredictionResult, MSG_PARSE_FAILED};

const FENCE: &str = "```";

/// Removes one surrounding Markdown fence (```lang\n ... \n```), if the whole
/// text is fenced. Nested fences are left alone.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.len() < 2 * FENCE.len() || !trimmed.starts_with(FENCE) || !trimmed.ends_with(FENCE)
    {
        return trimmed;
    }

    let inner = &trimmed[FENCE.len()..trimmed.len() - FENCE.len()];
    let tag_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(inner.len());
    let body = inner[tag_len..].trim();
    if body.is_empty() {
        return trimmed;
    }
    body
}

/// Turns raw model output into a canonical record. Never fails: unparseable
/// text becomes a failure record.
pub fn normalize(ticker: &str, raw_text: &str) -> PredictionResult {
    let json_str = strip_code_fence(raw_text);

    let value = match serde_json::from_str::<serde_json::Value>(json_str) {
        Ok(v) => v,
        Err(err) => {
            tracing::warn!(ticker, error = %err, "model output is not valid JSON");
            return PredictionResult::failure(ticker, MSG_PARSE_FAILED, MSG_PARSE_FAILED);
        }
    };

    let Some(payload) = LlmPredictionPayload::from_value(&value) else {
        tracing::warn!(ticker, "model output is JSON but not an object");
        return PredictionResult::failure(ticker, MSG_PARSE_FAILED, MSG_PARSE_FAILED);
    };

    if let Some(error) = payload.error.as_deref() {
        tracing::info!(ticker, error, "model declared no prediction");
    }

    payload.validate_and_into_result(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::prediction::{KeyFactor, Sentiment, Trend};

    #[test]
    fn strip_code_fence_handles_tagged_blocks() {
        let body = "{\"a\":1}";
        assert_eq!(strip_code_fence(&format!("```json\n{body}\n```\n")), body);
        assert_eq!(strip_code_fence(&format!("```\n{body}\n```")), body);
    }

    #[test]
    fn strip_code_fence_leaves_plain_text() {
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("``````"), "``````");
        assert_eq!(strip_code_fence("prefix ```json\n{}\n```"), "prefix ```json\n{}\n```");
    }

    #[test]
    fn strip_code_fence_applies_once() {
        let nested = "```\n```json\n{}\n```\n```";
        assert_eq!(strip_code_fence(nested), "```json\n{}\n```");
    }

    #[test]
    fn invalid_json_is_a_total_failure() {
        let r = normalize("aapl", "not json");
        assert_eq!(r.ticker, "AAPL");
        assert_eq!(r.sentiment, Sentiment::Error);
        assert_eq!(r.trend, Trend::Unknown);
        assert_eq!(r.confidence, 0.0);
        assert_eq!(r.summary, MSG_PARSE_FAILED);
        assert_eq!(r.error_message.as_deref(), Some(MSG_PARSE_FAILED));
        assert!(r.key_factors.is_empty());
        assert!(r.risks.is_empty());
        assert!(r.news_highlights.is_empty());
    }

    #[test]
    fn non_object_json_is_a_failure() {
        let r = normalize("aapl", "[1,2,3]");
        assert_eq!(r.error_message.as_deref(), Some(MSG_PARSE_FAILED));
    }

    #[test]
    fn fenced_declared_error_takes_error_path() {
        let raw = "```json\n{\"ticker\":\"AAPL\",\"error\":\"no data\"}\n```";
        let r = normalize("AAPL", raw);
        assert_eq!(r.ticker, "AAPL");
        assert_eq!(r.error_message.as_deref(), Some("no data"));
        assert_eq!(r.summary, "no data");
        assert_eq!(r.sentiment, Sentiment::Error);
        assert_eq!(r.trend, Trend::Unknown);
    }

    #[test]
    fn non_string_error_field_takes_error_path() {
        for (raw, expected) in [
            (r#"{"ticker":"AAPL","error":{"message":"rate limited"}}"#, "rate limited"),
            (r#"{"ticker":"AAPL","error":404}"#, "404"),
            (r#"{"ticker":"AAPL","error":true,"trend":"Up"}"#, "true"),
        ] {
            let r = normalize("aapl", raw);
            assert_eq!(r.error_message.as_deref(), Some(expected), "{raw}");
            assert_eq!(r.sentiment, Sentiment::Error);
            assert_eq!(r.summary, expected);
            assert_eq!(r.ticker, "AAPL");
        }
        assert_eq!(normalize("aapl", r#"{"error":true,"trend":"Up"}"#).trend, Trend::Up);
    }

    #[test]
    fn unrecognized_sentiment_defaults_to_neutral() {
        let raw = r#"{"ticker":"aapl","sentiment":"Bullish","trend":"Up","confidence_score":0.8,"summary":"ok","key_factors":[],"potential_risks":[],"recent_news_highlights":[]}"#;
        let r = normalize("aapl", raw);
        assert_eq!(r.ticker, "AAPL");
        assert_eq!(r.sentiment, Sentiment::Neutral);
        assert_eq!(r.trend, Trend::Up);
        assert_eq!(r.confidence, 0.8);
        assert_eq!(r.summary, "ok");
        assert!(r.error_message.is_none());
    }

    #[test]
    fn ticker_always_echoes_caller_input() {
        let raw = r#"{"ticker":"GOOG","sentiment":"Positive","trend":"Up"}"#;
        assert_eq!(normalize("  msft ", raw).ticker, "MSFT");
        let raw = r#"{"ticker":"","error":"nope"}"#;
        assert_eq!(normalize("tsla", raw).ticker, "TSLA");
    }

    #[test]
    fn invalid_factor_impact_defaults_per_entry() {
        let raw = r#"{"sentiment":"Negative","key_factors":[{"factor":"x","impact":"Bad"},{"factor":"y","impact":"Positive"}]}"#;
        let r = normalize("AAPL", raw);
        assert_eq!(
            r.key_factors,
            vec![
                KeyFactor {
                    factor: "x".to_string(),
                    impact: Sentiment::Neutral
                },
                KeyFactor {
                    factor: "y".to_string(),
                    impact: Sentiment::Positive
                },
            ]
        );
        assert_eq!(r.sentiment, Sentiment::Negative);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let r = normalize("AAPL", "{}");
        assert_eq!(r.sentiment, Sentiment::Neutral);
        assert_eq!(r.trend, Trend::Unknown);
        assert_eq!(r.confidence, 0.0);
        assert!(r.risks.is_empty() && r.news_highlights.is_empty());
        assert!(r.error_message.is_none());
    }

    #[test]
    fn collections_keep_model_order() {
        let raw = r#"{"potential_risks":["b","a","c"],"recent_news_highlights":["n2","n1"]}"#;
        let r = normalize("AAPL", raw);
        assert_eq!(r.risks, vec!["b", "a", "c"]);
        assert_eq!(r.news_highlights, vec!["n2", "n1"]);
    }

    #[test]
    fn normalize_is_idempotent() {
        let raw = "```json\n{\"sentiment\":\"Positive\",\"trend\":\"Stable\",\"key_factors\":[{\"factor\":\"f\",\"impact\":\"Nope\"}]}\n```";
        assert_eq!(normalize("amzn", raw), normalize("amzn", raw));
        assert_eq!(normalize("amzn", "garbage"), normalize("amzn", "garbage"));
    }
}
