//! Binance market data service.
//!
//! Fetches historical candle data (klines) over the public REST API. The
//! kline payload is a positional array; numeric fields arrive as strings
//! and are coerced best-effort, with malformed rows skipped.

use crate::domain::market::{Candle, Interval};
use crate::domain::ports::MarketDataService;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::infrastructure::http_client_factory::HttpClientFactory;

/// Hard cap the klines endpoint enforces per request.
const MAX_KLINES_PER_REQUEST: usize = 1000;

/// Pause between paginated requests to stay clear of rate limits.
const PAGE_DELAY_MS: u64 = 250;

pub struct BinanceMarketDataService {
    client: Client,
    base_url: String,
}

impl BinanceMarketDataService {
    pub fn new(base_url: String) -> Self {
        Self {
            client: HttpClientFactory::create_client(),
            base_url,
        }
    }

    async fn fetch_klines_page(
        &self,
        symbol: &str,
        interval: Interval,
        start_ms: i64,
        end_ms: i64,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = limit.min(MAX_KLINES_PER_REQUEST);

        let start_ms_str = start_ms.to_string();
        let end_ms_str = end_ms.to_string();
        let limit_str = limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("interval", interval.as_str()),
                ("startTime", start_ms_str.as_str()),
                ("endTime", end_ms_str.as_str()),
                ("limit", limit_str.as_str()),
            ])
            .send()
            .await
            .context("Failed to fetch klines from Binance")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Binance klines fetch failed ({}): {}", status, error_text);
        }

        let klines: Vec<serde_json::Value> = response
            .json()
            .await
            .context("Failed to parse Binance klines response")?;

        Ok(parse_klines(symbol, &klines))
    }
}

/// Decodes the positional kline arrays:
/// `[open_time, open, high, low, close, volume, close_time, quote_volume,
///   trade_count, taker_buy_base, taker_buy_quote, ignored]`.
/// Rows that fail coercion are dropped, not fatal.
pub fn parse_klines(symbol: &str, klines: &[serde_json::Value]) -> Vec<Candle> {
    let total = klines.len();
    let candles: Vec<Candle> = klines
        .iter()
        .filter_map(|k| {
            let arr = k.as_array()?;
            if arr.len() < 11 {
                return None;
            }

            let decimal = |v: &serde_json::Value| -> Option<Decimal> {
                v.as_str().and_then(|s| s.parse::<Decimal>().ok())
            };

            Some(Candle {
                symbol: symbol.to_string(),
                open_time: arr[0].as_i64()?,
                open: decimal(&arr[1])?,
                high: decimal(&arr[2])?,
                low: decimal(&arr[3])?,
                close: decimal(&arr[4])?,
                volume: decimal(&arr[5])?,
                close_time: arr[6].as_i64()?,
                quote_volume: decimal(&arr[7])?,
                trade_count: arr[8].as_u64()?,
                taker_buy_base: decimal(&arr[9])?,
                taker_buy_quote: decimal(&arr[10])?,
            })
        })
        .collect();

    if candles.len() < total {
        warn!(
            "Skipped {} malformed kline rows for {}",
            total - candles.len(),
            symbol
        );
    }

    candles
}

#[async_trait]
impl MarketDataService for BinanceMarketDataService {
    async fn get_klines(
        &self,
        symbol: &str,
        interval: Interval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let candles = self
            .fetch_klines_page(
                symbol,
                interval,
                start.timestamp_millis(),
                end.timestamp_millis(),
                limit,
            )
            .await?;

        info!("Fetched {} candles for {}", candles.len(), symbol);
        Ok(candles)
    }

    async fn get_full_history(
        &self,
        symbol: &str,
        interval: Interval,
        start: DateTime<Utc>,
    ) -> Result<Vec<Candle>> {
        let end_ms = Utc::now().timestamp_millis();
        let mut cursor = start.timestamp_millis();
        let mut all: Vec<Candle> = Vec::new();

        while cursor < end_ms {
            let page = self
                .fetch_klines_page(symbol, interval, cursor, end_ms, MAX_KLINES_PER_REQUEST)
                .await?;

            let Some(last) = page.last() else {
                break;
            };

            cursor = last.open_time + 1;
            all.extend(page);

            info!("Fetched {} candles for {} so far", all.len(), symbol);
            tokio::time::sleep(std::time::Duration::from_millis(PAGE_DELAY_MS)).await;
        }

        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kline(open_time: i64) -> serde_json::Value {
        json!([
            open_time,
            "100.0",
            "110.0",
            "90.0",
            "105.0",
            "12.5",
            open_time + 86_399_999,
            "1300.0",
            42,
            "6.0",
            "640.0",
            "0"
        ])
    }

    #[test]
    fn test_parse_klines_positional_fields() {
        let candles = parse_klines("BTCUSDT", &[kline(1_700_000_000_000)]);
        assert_eq!(candles.len(), 1);

        let c = &candles[0];
        assert_eq!(c.open_time, 1_700_000_000_000);
        assert_eq!(c.close.to_string(), "105.0");
        assert_eq!(c.trade_count, 42);
        assert_eq!(c.taker_buy_quote.to_string(), "640.0");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let rows = vec![
            kline(1),
            json!([2, "not-a-number", "1", "1", "1", "1", 3, "1", 1, "1", "1", "0"]),
            json!(["truncated"]),
            kline(4),
        ];
        let candles = parse_klines("ETHUSDT", &rows);
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[1].open_time, 4);
    }
}
