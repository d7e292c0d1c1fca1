use crate::domain::market::{Candle, Interval};
use crate::domain::ports::MarketDataService;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Canned-candle market data source for tests and offline runs.
pub struct MockMarketDataService {
    candles: Vec<Candle>,
}

impl MockMarketDataService {
    pub fn new(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    /// A source that always returns zero rows.
    pub fn empty() -> Self {
        Self {
            candles: Vec::new(),
        }
    }
}

#[async_trait]
impl MarketDataService for MockMarketDataService {
    async fn get_klines(
        &self,
        _symbol: &str,
        _interval: Interval,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let skip = self.candles.len().saturating_sub(limit);
        Ok(self.candles[skip..].to_vec())
    }

    async fn get_full_history(
        &self,
        _symbol: &str,
        _interval: Interval,
        start: DateTime<Utc>,
    ) -> Result<Vec<Candle>> {
        let start_ms = start.timestamp_millis();
        Ok(self
            .candles
            .iter()
            .filter(|c| c.open_time >= start_ms)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn candle(open_time: i64) -> Candle {
        Candle {
            symbol: "BTCUSDT".to_string(),
            open_time,
            open: Decimal::from(100),
            high: Decimal::from(110),
            low: Decimal::from(90),
            close: Decimal::from(105),
            volume: Decimal::ONE,
            close_time: open_time + 1,
            quote_volume: Decimal::ONE,
            trade_count: 1,
            taker_buy_base: Decimal::ONE,
            taker_buy_quote: Decimal::ONE,
        }
    }

    #[test]
    fn test_mock_respects_limit() {
        let mock = MockMarketDataService::new((0..20).map(candle).collect());
        let got = tokio_test::block_on(mock.get_klines(
            "BTCUSDT",
            Interval::OneDay,
            Utc::now(),
            Utc::now(),
            5,
        ))
        .unwrap();
        assert_eq!(got.len(), 5);
        assert_eq!(got.last().unwrap().open_time, 19);
    }
}
