use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use sentitrade_core::domain::prediction::PredictionResult;
use sentitrade_core::service::{PredictionService, PredictionTracker};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = sentitrade_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let service = match PredictionService::from_settings(&settings) {
        Ok(service) => service,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "model client setup failed; starting API in degraded mode");
            PredictionService::new(None, settings.grounding_enabled)
        }
    };

    let state = AppState {
        service,
        tracker: Arc::new(PredictionTracker::new()),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/predict", post(post_predict))
        .route("/predict/:ticker", get(get_predict))
        .route("/latest", get(get_latest))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    service: PredictionService,
    tracker: Arc<PredictionTracker>,
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    ticker: String,
}

#[derive(Debug, Serialize)]
struct ApiPrediction {
    request_id: Uuid,
    seq: u64,
    /// A newer request started before this one completed; clients should
    /// not display this result.
    superseded: bool,
    completed_at: DateTime<Utc>,
    prediction: PredictionResult,
}

async fn post_predict(
    State(state): State<AppState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<ApiPrediction>, StatusCode> {
    predict(&state, &req.ticker).await
}

async fn get_predict(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<ApiPrediction>, StatusCode> {
    predict(&state, &ticker).await
}

async fn predict(state: &AppState, ticker: &str) -> Result<Json<ApiPrediction>, StatusCode> {
    let ticker = validate_ticker(ticker).ok_or(StatusCode::BAD_REQUEST)?;
    let request_id = Uuid::new_v4();

    let (ticket, prediction, accepted) = state
        .service
        .request_tracked(&state.tracker, &ticker)
        .await;

    tracing::info!(
        %request_id,
        seq = ticket.seq,
        ticker = %ticket.ticker,
        failed = prediction.is_error(),
        superseded = !accepted,
        "prediction completed"
    );

    Ok(Json(ApiPrediction {
        request_id,
        seq: ticket.seq,
        superseded: !accepted,
        completed_at: Utc::now(),
        prediction,
    }))
}

#[derive(Debug, Serialize)]
struct ApiLatest {
    seq: u64,
    prediction: PredictionResult,
}

async fn get_latest(State(state): State<AppState>) -> Result<Json<ApiLatest>, StatusCode> {
    let current = state.tracker.current().await.ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ApiLatest {
        seq: current.seq,
        prediction: current.result,
    }))
}

/// Trimmed, upper-cased ticker, or `None` for blank input.
fn validate_ticker(raw: &str) -> Option<String> {
    let ticker = raw.trim().to_uppercase();
    if ticker.is_empty() {
        return None;
    }
    Some(ticker)
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &sentitrade_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
