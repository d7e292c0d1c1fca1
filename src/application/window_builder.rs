use crate::domain::errors::ForecastError;
use crate::domain::forecast::{FeatureSchema, FeatureWindow};
use crate::domain::market::Interval;
use crate::domain::ports::MarketDataService;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Extra candles requested beyond the window length so that skipped
/// malformed klines do not starve the window.
const FETCH_PAD: usize = 5;

/// Assembles a fixed-width window of feature rows ending at the most
/// recent available observation.
pub struct FeatureWindowBuilder {
    market_data: Arc<dyn MarketDataService>,
}

impl FeatureWindowBuilder {
    pub fn new(market_data: Arc<dyn MarketDataService>) -> Self {
        Self { market_data }
    }

    /// Fetches the trailing `len` candles for `symbol` and extracts one row
    /// per candle in schema order. Fails with `EmptyData` when the source
    /// yields fewer than `len` usable rows.
    pub async fn build(
        &self,
        symbol: &str,
        interval: Interval,
        schema: &FeatureSchema,
        len: usize,
        end: DateTime<Utc>,
    ) -> Result<FeatureWindow, ForecastError> {
        let span = interval.step() * (len + FETCH_PAD) as i32;
        let start = end - span;

        let candles = self
            .market_data
            .get_klines(symbol, interval, start, end, len + FETCH_PAD)
            .await
            .map_err(|e| ForecastError::DataFetch {
                symbol: symbol.to_string(),
                source: e,
            })?;

        if candles.len() < len {
            return Err(ForecastError::EmptyData {
                symbol: symbol.to_string(),
                needed: len,
                got: candles.len(),
            });
        }

        debug!(
            "Built {}-row window for {} from {} candles ({})",
            len,
            symbol,
            candles.len(),
            schema.describe()
        );

        let rows: Vec<Vec<f64>> = candles[candles.len() - len..]
            .iter()
            .map(|c| schema.row(c))
            .collect();

        FeatureWindow::from_rows(rows)
    }
}
