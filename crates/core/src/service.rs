use crate::config::Settings;
use crate::domain::prediction::{canonical_ticker, PredictionResult};
use crate::llm::error::FailureKind;
use crate::llm::gemini::GeminiClient;
use crate::llm::json::normalize;
use crate::llm::prompt::build_prompt;
use crate::llm::sources::extract_sources;
use crate::llm::{GenerateRequest, ModelClient};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Entry point for the presentation layer: one ticker in, one total record out.
#[derive(Clone)]
pub struct PredictionService {
    client: Option<Arc<dyn ModelClient>>,
    grounding: bool,
}

impl PredictionService {
    /// A missing credential is not an error here; every request will
    /// short-circuit to a configuration failure instead.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client: Option<Arc<dyn ModelClient>> = match settings.gemini_api_key {
            Some(_) => {
                let client = GeminiClient::from_settings(settings)?;
                tracing::info!(model = client.model(), "Gemini client configured");
                Some(Arc::new(client) as Arc<dyn ModelClient>)
            }
            None => {
                tracing::error!("API_KEY environment variable not set; predictions will fail");
                None
            }
        };
        Ok(Self::new(client, settings.grounding_enabled))
    }

    pub fn new(client: Option<Arc<dyn ModelClient>>, grounding: bool) -> Self {
        Self { client, grounding }
    }

    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn request_prediction(&self, ticker: &str) -> PredictionResult {
        let ticker = canonical_ticker(ticker);

        let Some(client) = &self.client else {
            tracing::warn!(%ticker, "prediction skipped: API key not configured");
            return PredictionResult::missing_api_key(&ticker);
        };

        let request = GenerateRequest {
            prompt: build_prompt(&ticker),
            grounding: self.grounding,
        };

        match client.generate(request).await {
            Ok(reply) => {
                let result = normalize(&ticker, &reply.text);
                if self.grounding {
                    result.with_sources(extract_sources(&reply.grounding_chunks))
                } else {
                    result
                }
            }
            Err(err) => {
                let kind = FailureKind::classify(&err);
                tracing::error!(
                    %ticker,
                    provider = ?client.provider(),
                    ?kind,
                    error = %format!("{err:#}"),
                    "prediction request failed"
                );
                PredictionResult::failure(&ticker, kind.message(), kind.message())
            }
        }
    }

    /// Runs a request through `tracker`; the returned flag is false when a
    /// newer request started before this one finished.
    pub async fn request_tracked(
        &self,
        tracker: &PredictionTracker,
        ticker: &str,
    ) -> (RequestTicket, PredictionResult, bool) {
        let ticket = tracker.begin(ticker).await;
        let result = self.request_prediction(&ticket.ticker).await;
        let accepted = tracker.complete(&ticket, result.clone()).await;
        (ticket, result, accepted)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub seq: u64,
    pub ticker: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedPrediction {
    pub seq: u64,
    pub result: PredictionResult,
}

#[derive(Debug, Default)]
struct Slot {
    latest_seq: u64,
    current: Option<TrackedPrediction>,
}

/// The single "current result" slot. Only the most recently issued request
/// may fill it; starting a request empties it.
#[derive(Debug, Default)]
pub struct PredictionTracker {
    slot: RwLock<Slot>,
}

impl PredictionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn begin(&self, ticker: &str) -> RequestTicket {
        let mut slot = self.slot.write().await;
        slot.latest_seq += 1;
        slot.current = None;
        RequestTicket {
            seq: slot.latest_seq,
            ticker: canonical_ticker(ticker),
        }
    }

    pub async fn complete(&self, ticket: &RequestTicket, result: PredictionResult) -> bool {
        let mut slot = self.slot.write().await;
        if ticket.seq != slot.latest_seq {
            tracing::info!(
                seq = ticket.seq,
                latest_seq = slot.latest_seq,
                ticker = %ticket.ticker,
                "discarding stale prediction"
            );
            return false;
        }
        slot.current = Some(TrackedPrediction {
            seq: ticket.seq,
            result,
        });
        true
    }

    pub async fn current(&self) -> Option<TrackedPrediction> {
        self.slot.read().await.current.clone()
    }

    pub async fn latest_seq(&self) -> u64 {
        self.slot.read().await.latest_seq
    }
}
