//! Train -> persist -> reload -> forecast round trips on synthetic data.

use cryptocast::application::model::{ModelKind, load_model};
use cryptocast::application::training::{Dataset, TrainingOptions, train};
use cryptocast::application::{FeatureWindowBuilder, ForecastService};
use cryptocast::config::Config;
use cryptocast::domain::errors::ForecastError;
use cryptocast::domain::forecast::{FeatureSchema, MinMaxScaler, ScalerArtifact};
use cryptocast::domain::market::{Candle, Interval};
use cryptocast::infrastructure::artifact_store::FileArtifactStore;
use cryptocast::infrastructure::mock::MockMarketDataService;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::path::PathBuf;
use std::sync::Arc;

/// close(t) = open(t) + 0.5 with open(t) = 100 + t, so the next close is
/// exactly open + 1.5: a relationship OLS recovers to machine precision.
/// The other columns vary on incommensurate cycles to keep the feature
/// matrix full rank.
fn candle(t: i64) -> Candle {
    let open = Decimal::from(100 + t);
    Candle {
        symbol: "BTCUSDT".to_string(),
        open_time: t * 86_400_000,
        open,
        high: open + Decimal::from(2 + t % 3),
        low: open - Decimal::from(2 + t % 5),
        close: open + dec!(0.5),
        volume: Decimal::from(10 + t % 7),
        close_time: (t + 1) * 86_400_000 - 1,
        quote_volume: Decimal::from(1000 + 3 * t + t % 11),
        trade_count: (50 + (t * 7) % 13) as u64,
        taker_buy_base: Decimal::from(5 + t % 4),
        taker_buy_quote: Decimal::from(500 + 2 * t + t % 17),
    }
}

fn temp_store(tag: &str) -> FileArtifactStore {
    let dir: PathBuf =
        std::env::temp_dir().join(format!("cryptocast-it-{}-{}", tag, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    FileArtifactStore::new(dir)
}

fn train_and_save(store: &FileArtifactStore, scaled: bool) {
    let candles: Vec<Candle> = (0..50).map(candle).collect();
    let schema = FeatureSchema::compact();
    let dataset = Dataset::from_candles(&candles, &schema).unwrap();

    let opts = TrainingOptions {
        kind: ModelKind::Linear,
        scaled,
        split: Some(0.8),
        ..Default::default()
    };
    let (artifacts, report) = train(&dataset, &schema, &opts).unwrap();
    assert!(report.rmse.unwrap() < 1e-6, "rmse = {:?}", report.rmse);

    let prefix = Config::symbol_prefix("BTCUSDT");
    store.save_model(&prefix, ModelKind::Linear, &artifacts.model).unwrap();
    if let Some(scaler) = &artifacts.scaler {
        store.save_scaler(&prefix, scaler).unwrap();
    }
}

async fn forecast_next_close(store: &FileArtifactStore) -> f64 {
    let model = load_model(store, "btc", ModelKind::Linear).unwrap();

    // fresh candles the model never saw; latest open is 169
    let mock = Arc::new(MockMarketDataService::new((50..70).map(candle).collect()));
    let service =
        ForecastService::new(FeatureWindowBuilder::new(mock), Interval::OneDay, 10, 1).unwrap();

    let predictions = service.predict("BTCUSDT", &model).await.unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0].symbol, "BTCUSDT");
    assert_eq!(predictions[0].model, "btc_linear");
    predictions[0].close
}

#[tokio::test]
async fn raw_round_trip_predicts_next_close() {
    let store = temp_store("raw");
    train_and_save(&store, false);

    let close = forecast_next_close(&store).await;
    assert!((close - 170.5).abs() < 1e-6, "close = {}", close);

    let _ = std::fs::remove_dir_all(store.dir());
}

#[tokio::test]
async fn scaled_round_trip_returns_price_units() {
    let store = temp_store("scaled");
    train_and_save(&store, true);

    let close = forecast_next_close(&store).await;
    assert!((close - 170.5).abs() < 1e-4, "close = {}", close);

    let _ = std::fs::remove_dir_all(store.dir());
}

#[test]
fn mismatched_scaler_schema_fails_at_load() {
    let store = temp_store("mismatch");
    train_and_save(&store, true);

    // replace the paired scaler with one fitted on a different layout
    let full = FeatureSchema::full();
    let rows = vec![vec![0.0; full.width()], vec![1.0; full.width()]];
    let wrong = ScalerArtifact {
        schema: full,
        features: MinMaxScaler::fit(&rows).unwrap(),
        target: MinMaxScaler::fit_column(&[0.0, 1.0]).unwrap(),
    };
    store.save_scaler("btc", &wrong).unwrap();

    let err = load_model(&store, "btc", ModelKind::Linear).unwrap_err();
    assert!(matches!(err, ForecastError::FeatureMismatch { .. }));

    let _ = std::fs::remove_dir_all(store.dir());
}

#[test]
fn missing_artifact_names_the_file() {
    let store = temp_store("missing");

    let err = load_model(&store, "eth", ModelKind::Forest).unwrap_err();
    assert!(matches!(err, ForecastError::ArtifactNotFound { .. }));
    assert!(err.to_string().contains("eth_forest.json"));
}
