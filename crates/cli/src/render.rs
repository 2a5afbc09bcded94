use sentitrade_core::domain::prediction::{KeyFactor, PredictionResult, Sentiment, Trend};
use std::fmt::Write;

const DISCLAIMER: &str =
    "Disclaimer: AI-generated analysis, not financial advice. Always do your own research.";

fn trend_icon(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "▲",
        Trend::Down => "▼",
        Trend::Stable => "▬",
        Trend::Unknown => "?",
    }
}

fn impact_marker(impact: Sentiment) -> &'static str {
    match impact {
        Sentiment::Positive => "✚",
        Sentiment::Negative => "▬",
        Sentiment::Neutral | Sentiment::Error => "•",
    }
}

/// Plain-text report. Failure records render as an error panel only when the
/// model gave nothing beyond the error text.
pub fn render_prediction(r: &PredictionResult) -> String {
    let mut out = String::new();

    if let Some(error) = r.error_message.as_deref() {
        if r.summary.is_empty() || r.summary == error {
            let _ = writeln!(
                out,
                "[{}] Prediction Error for {}",
                r.sentiment.as_str(),
                r.ticker
            );
            let _ = writeln!(out, "  {error}");
            return out;
        }
    }

    let _ = writeln!(
        out,
        "{}  {} {}",
        r.ticker,
        trend_icon(r.trend),
        r.trend.as_str()
    );
    let _ = writeln!(out, "  {}", r.summary);
    let _ = writeln!(out);
    let _ = writeln!(out, "Overall Sentiment: {}", r.sentiment.as_str());
    let _ = writeln!(out, "Confidence: {:.0}%", r.confidence * 100.0);

    if let Some(error) = r.error_message.as_deref() {
        let _ = writeln!(out, "Note: {error}");
    }

    if !r.key_factors.is_empty() {
        section(&mut out, "Key Factors");
        for KeyFactor { factor, impact } in &r.key_factors {
            let _ = writeln!(out, "  {} {factor}", impact_marker(*impact));
        }
    }

    list_section(&mut out, "Potential Risks", &r.risks);
    list_section(&mut out, "Recent News Highlights", &r.news_highlights);

    if let Some(sources) = r.sources.as_ref().filter(|s| !s.is_empty()) {
        section(&mut out, "Sources");
        for s in sources {
            let _ = writeln!(out, "  - {} <{}>", s.title, s.uri);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{DISCLAIMER}");
    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
}

fn list_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    section(out, title);
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentitrade_core::domain::prediction::GroundingSource;

    fn success() -> PredictionResult {
        PredictionResult {
            ticker: "AAPL".to_string(),
            sentiment: Sentiment::Positive,
            trend: Trend::Up,
            confidence: 0.82,
            summary: "Strong services growth.".to_string(),
            key_factors: vec![
                KeyFactor {
                    factor: "Earnings beat".to_string(),
                    impact: Sentiment::Positive,
                },
                KeyFactor {
                    factor: "China demand".to_string(),
                    impact: Sentiment::Negative,
                },
            ],
            risks: vec!["Regulation".to_string()],
            news_highlights: Vec::new(),
            sources: Some(vec![GroundingSource {
                uri: "https://news.example/a".to_string(),
                title: "A".to_string(),
            }]),
            error_message: None,
        }
    }

    #[test]
    fn renders_success_report() {
        let out = render_prediction(&success());
        assert!(out.starts_with("AAPL  ▲ Up"));
        assert!(out.contains("Confidence: 82%"));
        assert!(out.contains("✚ Earnings beat"));
        assert!(out.contains("▬ China demand"));
        assert!(out.contains("Potential Risks"));
        assert!(!out.contains("Recent News Highlights"));
        assert!(out.contains("A <https://news.example/a>"));
    }

    #[test]
    fn renders_error_panel_for_bare_failures() {
        let r = PredictionResult::failure("tsla", "no data", "no data");
        let out = render_prediction(&r);
        assert!(out.contains("Prediction Error for TSLA"));
        assert!(out.contains("no data"));
        assert!(!out.contains("Confidence"));
    }

    #[test]
    fn failure_with_partial_data_renders_report_with_note() {
        let mut r = PredictionResult::failure("msft", "Partial view only.", "thin coverage");
        r.trend = Trend::Stable;
        let out = render_prediction(&r);
        assert!(out.contains("MSFT  ▬ Stable"));
        assert!(out.contains("Note: thin coverage"));
    }
}
