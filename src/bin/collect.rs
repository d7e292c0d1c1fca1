//! Historical data collection.
//!
//! Pages through the klines endpoint from a start date to now and writes
//! one CSV of candle history per symbol.

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use clap::Parser;
use cryptocast::config::Config;
use cryptocast::domain::market::Interval;
use cryptocast::domain::ports::MarketDataService;
use cryptocast::infrastructure::binance::BinanceMarketDataService;
use cryptocast::infrastructure::candle_csv::save_candles;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{Level, error, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Symbols to collect, comma separated (defaults to SYMBOLS env)
    #[arg(long)]
    symbols: Option<String>,

    /// Candle interval: 1h or 1d (defaults to INTERVAL env)
    #[arg(long)]
    interval: Option<String>,

    /// Collection start date, YYYY-MM-DD
    #[arg(long, default_value = "2017-01-01")]
    start: String,

    /// Output directory for CSV files (defaults to DATA_DIR env)
    #[arg(long)]
    out_dir: Option<PathBuf>,
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
    let interval = match &args.interval {
        Some(s) => Interval::from_str(s)?,
        None => config.interval,
    };
    let out_dir = args.out_dir.unwrap_or_else(|| config.data_dir.clone());

    let start_date = NaiveDate::parse_from_str(&args.start, "%Y-%m-%d")
        .with_context(|| format!("Invalid start date: {}", args.start))?;
    let start_naive = start_date
        .and_hms_opt(0, 0, 0)
        .context("Invalid start time")?;
    let start = Utc.from_utc_datetime(&start_naive);

    info!(
        "Collecting {} history for {:?} from {}",
        interval, symbols, args.start
    );

    let service = BinanceMarketDataService::new(config.base_url);

    for symbol in &symbols {
        match service.get_full_history(symbol, interval, start).await {
            Ok(candles) if candles.is_empty() => {
                warn!("No candles returned for {}", symbol);
            }
            Ok(candles) => {
                let path = out_dir.join(format!("{}.csv", symbol.to_lowercase()));
                save_candles(&path, &candles)?;
            }
            Err(e) => {
                error!("Collection failed for {}: {}", symbol, e);
            }
        }
    }

    info!("Data collection completed.");
    Ok(())
}
