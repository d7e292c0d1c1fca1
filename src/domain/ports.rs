use crate::domain::errors::ForecastError;
use crate::domain::forecast::forecaster::Prediction;
use crate::domain::forecast::window::FeatureWindow;
use crate::domain::market::{Candle, Interval};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Candle source. Implementations perform blocking network I/O per call;
/// failures propagate without retry.
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// Ordered candles for `[start, end]`, capped at `limit` rows.
    async fn get_klines(
        &self,
        symbol: &str,
        interval: Interval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Candle>>;

    /// All candles from `start` to now, paginating past the per-request cap.
    async fn get_full_history(
        &self,
        symbol: &str,
        interval: Interval,
        start: DateTime<Utc>,
    ) -> Result<Vec<Candle>>;
}

/// Uniform prediction capability over the model family, resolved once at
/// load time instead of re-branched at every call site.
pub trait Regressor: Send + Sync {
    /// One scalar forecast from the current window. Tabular models read only
    /// the latest row; sequence models consume the whole window.
    fn predict_next(&self, window: &FeatureWindow) -> Result<f64, ForecastError>;

    fn name(&self) -> &str;

    /// Exact window length the model requires, if it cares.
    fn window_len(&self) -> Option<usize> {
        None
    }
}

/// Append-only sink for emitted predictions.
pub trait PredictionLog: Send + Sync {
    fn append(&self, predictions: &[Prediction]) -> Result<()>;
}
