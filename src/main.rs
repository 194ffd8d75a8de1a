use anyhow::{bail, Context};
use augur::{Config, SignalAggregator, SignalPayload};
use serde_json::json;
use std::fs;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "augur=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();

    // Usage: augur [payload.json] [symbol]
    let mut args = std::env::args().skip(1);
    let path = match args.next().or_else(|| config.payload_path.clone()) {
        Some(path) => path,
        None => bail!("usage: augur <payload.json> [symbol] (or set AUGUR_PAYLOAD)"),
    };
    let symbol = args
        .next()
        .map(|s| s.to_uppercase())
        .unwrap_or_else(|| config.symbol.clone());

    let raw = fs::read_to_string(&path).with_context(|| format!("reading payload {}", path))?;
    let payload: SignalPayload =
        serde_json::from_str(&raw).with_context(|| format!("parsing payload {}", path))?;

    let aggregator = SignalAggregator::from_config(&config);
    info!(
        "Evaluating {} signals for {} (parallel: {})",
        aggregator.signals().len(),
        symbol,
        config.parallel
    );

    let score = aggregator.aggregate(&symbol, &payload);
    let breakdown = aggregator.signal_breakdown(&score);

    let output = json!({
        "score": score,
        "breakdown": breakdown,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
