//! Inference over persisted models.
//!
//! Walks every symbol/model pairing sequentially: load artifacts once,
//! fetch a fresh window, forecast, log and print. A failed pairing aborts
//! only itself.

use anyhow::Result;
use clap::Parser;
use cryptocast::application::model::{LoadedModel, ModelKind, load_model};
use cryptocast::application::{FeatureWindowBuilder, ForecastService};
use cryptocast::config::{Config, LogFormat};
use cryptocast::domain::ports::PredictionLog;
use cryptocast::infrastructure::artifact_store::FileArtifactStore;
use cryptocast::infrastructure::binance::BinanceMarketDataService;
use cryptocast::infrastructure::prediction_log::{JsonPredictionLog, TextPredictionLog};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Symbols to predict, comma separated (defaults to SYMBOLS env)
    #[arg(long)]
    symbols: Option<String>,

    /// Model kinds to run per symbol, comma separated
    #[arg(long, default_value = "linear,forest")]
    models: String,

    /// Forecast horizon in steps (defaults to HORIZON env)
    #[arg(long)]
    horizon: Option<usize>,

    /// Prediction log format: text or json (defaults to LOG_FORMAT env)
    #[arg(long)]
    format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let symbols: Vec<String> = match &args.symbols {
        Some(s) => s.split(',').map(|s| s.trim().to_uppercase()).collect(),
        None => config.symbols.clone(),
    };
    let kinds = args
        .models
        .split(',')
        .map(|s| ModelKind::from_str(s.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    let horizon = args.horizon.unwrap_or(config.horizon);
    let log_format = match &args.format {
        Some(s) => LogFormat::from_str(s)?,
        None => config.log_format,
    };

    info!(
        "Predicting {:?} with {:?} models, horizon {}",
        symbols, kinds, horizon
    );

    let market_data = Arc::new(BinanceMarketDataService::new(config.base_url.clone()));
    let service = ForecastService::new(
        FeatureWindowBuilder::new(market_data),
        config.interval,
        config.window_len,
        horizon,
    )?;
    let store = FileArtifactStore::new(config.artifacts_dir.clone());

    // Load every artifact pairing up front; a missing or mismatched
    // artifact skips only its own pairing.
    let mut jobs: Vec<(String, LoadedModel)> = Vec::new();
    for symbol in &symbols {
        let prefix = Config::symbol_prefix(symbol);
        for kind in &kinds {
            match load_model(&store, &prefix, *kind) {
                Ok(model) => jobs.push((symbol.clone(), model)),
                Err(e) => {
                    error!("Skipping {} {}: {}", symbol, kind, e);
                }
            }
        }
    }

    if jobs.is_empty() {
        anyhow::bail!("No usable model artifacts found in {:?}", config.artifacts_dir);
    }

    let job_refs: Vec<(String, &LoadedModel)> =
        jobs.iter().map(|(s, m)| (s.clone(), m)).collect();
    let predictions = service.predict_batch(&job_refs).await;

    if predictions.is_empty() {
        warn!("No predictions produced.");
        return Ok(());
    }

    let log: Box<dyn PredictionLog> = match log_format {
        LogFormat::Text => Box::new(TextPredictionLog::new(config.log_path.clone())),
        LogFormat::Json => Box::new(JsonPredictionLog::new(config.log_path.clone())),
    };
    log.append(&predictions)?;

    for p in &predictions {
        println!(
            "Predicted close value for {} using {} on {}: {}",
            p.symbol,
            p.model,
            p.timestamp.format("%Y-%m-%d %H:%M:%S"),
            p.close
        );
    }

    Ok(())
}
