use crate::domain::errors::ForecastError;
use crate::domain::forecast::FeatureSchema;
use crate::domain::market::Candle;

/// Supervised rows extracted from candle history. The target for each row
/// is the next candle's close, so the final candle contributes no row.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub rows: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

impl Dataset {
    pub fn from_candles(candles: &[Candle], schema: &FeatureSchema) -> Result<Self, ForecastError> {
        if candles.len() < 2 {
            return Err(ForecastError::EmptyData {
                symbol: candles
                    .first()
                    .map(|c| c.symbol.clone())
                    .unwrap_or_else(|| "<unknown>".to_string()),
                needed: 2,
                got: candles.len(),
            });
        }

        let rows = candles[..candles.len() - 1]
            .iter()
            .map(|c| schema.row(c))
            .collect();
        let targets = candles[1..]
            .iter()
            .map(|c| FeatureSchema::close_of(c))
            .collect();

        Ok(Self { rows, targets })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Chronological split; no shuffling, the test slice is always the most
    /// recent data.
    pub fn split(&self, train_fraction: f64) -> (Dataset, Dataset) {
        let cut = ((self.len() as f64) * train_fraction).floor() as usize;
        let cut = cut.min(self.len());
        (
            Dataset {
                rows: self.rows[..cut].to_vec(),
                targets: self.targets[..cut].to_vec(),
            },
            Dataset {
                rows: self.rows[cut..].to_vec(),
                targets: self.targets[cut..].to_vec(),
            },
        )
    }
}
