use clap::Parser;
use sentitrade_core::service::PredictionService;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

const TICKER_EXAMPLES: &[&str] = &["AAPL", "GOOGL", "MSFT", "TSLA", "AMZN"];

#[derive(Debug, Parser)]
#[command(
    name = "sentitrade",
    about = "AI-powered stock sentiment analysis",
    after_help = "Examples: sentitrade AAPL | sentitrade GOOGL MSFT --json"
)]
struct Args {
    /// Stock ticker symbols (e.g. AAPL GOOGL MSFT TSLA AMZN).
    #[arg(required = true)]
    tickers: Vec<String>,

    /// Print the canonical prediction record as JSON instead of a report.
    #[arg(long)]
    json: bool,

    /// Let the model ground its answer with web search and list the sources.
    #[arg(long)]
    grounding: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = sentitrade_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let service = PredictionService::from_settings(&settings)
        .inspect_err(|e| {
            sentry_anyhow::capture_anyhow(e);
        })?
        .with_grounding(args.grounding || settings.grounding_enabled);

    let mut requested = 0usize;
    for raw in &args.tickers {
        let ticker = raw.trim().to_uppercase();
        if ticker.is_empty() {
            tracing::warn!(
                examples = %TICKER_EXAMPLES.join(", "),
                "skipping blank ticker"
            );
            continue;
        }

        requested += 1;
        let result = service.request_prediction(&ticker).await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", render::render_prediction(&result));
        }
    }

    anyhow::ensure!(
        requested > 0,
        "no ticker given; try one of {}",
        TICKER_EXAMPLES.join(", ")
    );
    Ok(())
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
