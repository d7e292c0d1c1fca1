use crate::domain::errors::ForecastError;
use crate::domain::market::Candle;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// One numeric feature derivable from a single candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureField {
    Open,
    High,
    Low,
    Close,
    Volume,
    QuoteVolume,
    TradeCount,
    TakerBuyBase,
    TakerBuyQuote,
    /// (high + low) / 2
    AveragePrice,
    /// close - open
    PriceChange,
    /// high - low
    PriceRange,
}

impl FeatureField {
    pub fn extract(&self, candle: &Candle) -> f64 {
        let f = |d: rust_decimal::Decimal| d.to_f64().unwrap_or(0.0);
        match self {
            FeatureField::Open => f(candle.open),
            FeatureField::High => f(candle.high),
            FeatureField::Low => f(candle.low),
            FeatureField::Close => f(candle.close),
            FeatureField::Volume => f(candle.volume),
            FeatureField::QuoteVolume => f(candle.quote_volume),
            FeatureField::TradeCount => candle.trade_count as f64,
            FeatureField::TakerBuyBase => f(candle.taker_buy_base),
            FeatureField::TakerBuyQuote => f(candle.taker_buy_quote),
            FeatureField::AveragePrice => (f(candle.high) + f(candle.low)) / 2.0,
            FeatureField::PriceChange => f(candle.close) - f(candle.open),
            FeatureField::PriceRange => f(candle.high) - f(candle.low),
        }
    }
}

/// Named, versioned, ordered feature layout.
///
/// The field set and order MUST match exactly what the paired model was
/// trained on. Every persisted artifact embeds its schema so the match is
/// checked at load time instead of silently mis-aligning columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub name: String,
    pub version: u32,
    pub fields: Vec<FeatureField>,
}

impl FeatureSchema {
    /// The 10-field layout used by the sequence models.
    pub fn full() -> Self {
        Self {
            name: "candle-full".to_string(),
            version: 1,
            fields: vec![
                FeatureField::Open,
                FeatureField::High,
                FeatureField::Low,
                FeatureField::Volume,
                FeatureField::QuoteVolume,
                FeatureField::TradeCount,
                FeatureField::TakerBuyBase,
                FeatureField::TakerBuyQuote,
                FeatureField::AveragePrice,
                FeatureField::PriceChange,
            ],
        }
    }

    /// The reduced 7-field layout used by the tabular models.
    pub fn compact() -> Self {
        Self {
            name: "candle-compact".to_string(),
            version: 1,
            fields: vec![
                FeatureField::Open,
                FeatureField::High,
                FeatureField::Low,
                FeatureField::QuoteVolume,
                FeatureField::TradeCount,
                FeatureField::TakerBuyQuote,
                FeatureField::PriceRange,
            ],
        }
    }

    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// Extracts one feature row from a candle, in schema field order.
    pub fn row(&self, candle: &Candle) -> Vec<f64> {
        self.fields.iter().map(|f| f.extract(candle)).collect()
    }

    /// Fails with FeatureMismatch unless `other` is the identical layout.
    pub fn validate_against(&self, other: &FeatureSchema) -> Result<(), ForecastError> {
        if self != other {
            return Err(ForecastError::FeatureMismatch {
                expected: self.describe(),
                actual: other.describe(),
            });
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        format!("{} v{} ({} fields)", self.name, self.version, self.width())
    }

    /// The close price as f64, the universal prediction target.
    pub fn close_of(candle: &Candle) -> f64 {
        FeatureField::Close.extract(candle)
    }
}

impl std::str::FromStr for FeatureSchema {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" | "candle-full" => Ok(FeatureSchema::full()),
            "compact" | "candle-compact" => Ok(FeatureSchema::compact()),
            _ => anyhow::bail!("Unknown feature schema: {}. Must be 'full' or 'compact'", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn candle() -> Candle {
        Candle {
            symbol: "BTCUSDT".to_string(),
            open_time: 1_700_000_000_000,
            open: dec!(100),
            high: dec!(110),
            low: dec!(90),
            close: dec!(105),
            volume: dec!(12.5),
            close_time: 1_700_086_399_999,
            quote_volume: dec!(1300),
            trade_count: 42,
            taker_buy_base: dec!(6),
            taker_buy_quote: dec!(640),
        }
    }

    #[test]
    fn test_row_matches_field_order() {
        let schema = FeatureSchema::full();
        let row = schema.row(&candle());
        assert_eq!(row.len(), schema.width());
        assert_eq!(row[0], 100.0); // open leads
        assert_eq!(row[8], 100.0); // average price (110+90)/2
        assert_eq!(row[9], 5.0); // price change 105-100
    }

    #[test]
    fn test_compact_row_derived_fields() {
        let schema = FeatureSchema::compact();
        let row = schema.row(&candle());
        assert_eq!(row.len(), 7);
        assert_eq!(*row.last().unwrap(), 20.0); // price range 110-90
        assert_eq!(row[4], 42.0); // trade count
    }

    #[test]
    fn test_validate_rejects_different_layout() {
        let full = FeatureSchema::full();
        let compact = FeatureSchema::compact();
        let err = full.validate_against(&compact).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("candle-full"));
        assert!(msg.contains("candle-compact"));
        assert!(full.validate_against(&FeatureSchema::full()).is_ok());
    }
}
