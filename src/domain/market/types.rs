use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One exchange kline/candlestick observation.
///
/// Carries the full kline payload, not just OHLCV: the quote volume,
/// trade count and taker-buy fields feed the feature schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    /// Open time in epoch milliseconds.
    pub open_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Close time in epoch milliseconds.
    pub close_time: i64,
    pub quote_volume: Decimal,
    pub trade_count: u64,
    pub taker_buy_base: Decimal,
    pub taker_buy_quote: Decimal,
}

/// Candle granularity requested from the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    OneHour,
    OneDay,
}

impl Interval {
    /// The interval string the klines endpoint expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
        }
    }

    pub fn millis(&self) -> i64 {
        match self {
            Interval::OneHour => 60 * 60 * 1000,
            Interval::OneDay => 24 * 60 * 60 * 1000,
        }
    }

    /// Step between consecutive candles, and between forecast horizons.
    pub fn step(&self) -> chrono::Duration {
        match self {
            Interval::OneHour => chrono::Duration::hours(1),
            Interval::OneDay => chrono::Duration::days(1),
        }
    }
}

impl std::str::FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1h" => Ok(Interval::OneHour),
            "1d" => Ok(Interval::OneDay),
            _ => anyhow::bail!("Invalid INTERVAL: {}. Must be '1h' or '1d'", s),
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_interval_round_trip() {
        assert_eq!(Interval::from_str("1d").unwrap(), Interval::OneDay);
        assert_eq!(Interval::from_str("1H").unwrap(), Interval::OneHour);
        assert_eq!(Interval::OneDay.as_str(), "1d");
        assert!(Interval::from_str("5m").is_err());
    }

    #[test]
    fn test_interval_step_matches_millis() {
        for interval in [Interval::OneHour, Interval::OneDay] {
            assert_eq!(
                interval.step().num_milliseconds(),
                interval.millis(),
                "step and millis disagree for {}",
                interval
            );
        }
    }
}
