use crate::domain::market::Interval;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Output format for the prediction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid LOG_FORMAT: {}. Must be 'text' or 'json'", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub symbols: Vec<String>,
    pub interval: Interval,
    pub window_len: usize,
    pub horizon: usize,
    pub artifacts_dir: PathBuf,
    pub data_dir: PathBuf,
    pub log_path: PathBuf,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let base_url =
            env::var("BINANCE_BASE_URL").unwrap_or_else(|_| "https://api.binance.com".to_string());

        let symbols_str = env::var("SYMBOLS").unwrap_or_else(|_| "BTCUSDT,ETHUSDT".to_string());
        let symbols: Vec<String> = symbols_str
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();

        let interval_str = env::var("INTERVAL").unwrap_or_else(|_| "1d".to_string());
        let interval = Interval::from_str(&interval_str)?;

        let window_len = env::var("WINDOW_LEN")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<usize>()
            .context("Failed to parse WINDOW_LEN")?;

        let horizon = env::var("HORIZON")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<usize>()
            .context("Failed to parse HORIZON")?;

        let artifacts_dir =
            PathBuf::from(env::var("ARTIFACTS_DIR").unwrap_or_else(|_| "artifacts".to_string()));
        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()));
        let log_path =
            PathBuf::from(env::var("PREDICTION_LOG").unwrap_or_else(|_| "predictions.log".to_string()));

        let log_format_str = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let log_format = LogFormat::from_str(&log_format_str)?;

        if window_len == 0 {
            anyhow::bail!("WINDOW_LEN must be at least 1");
        }
        if horizon == 0 {
            anyhow::bail!("HORIZON must be at least 1");
        }

        Ok(Self {
            base_url,
            symbols,
            interval,
            window_len,
            horizon,
            artifacts_dir,
            data_dir,
            log_path,
            log_format,
        })
    }

    /// Artifact filename prefix for a symbol: first three letters,
    /// lowercased (`BTCUSDT` -> `btc`).
    pub fn symbol_prefix(symbol: &str) -> String {
        symbol.chars().take(3).collect::<String>().to_lowercase()
    }
}
