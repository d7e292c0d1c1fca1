use crate::application::model::LoadedModel;
use crate::application::window_builder::FeatureWindowBuilder;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::{Forecaster, Prediction, future_timestamps};
use crate::domain::market::Interval;
use chrono::Utc;
use tracing::{error, info};

/// Orchestrates one prediction run: build window, apply the scaling
/// boundary if the model carries one, run the autoregressive loop, map the
/// outputs back to price units and stamp them.
pub struct ForecastService {
    window_builder: FeatureWindowBuilder,
    forecaster: Forecaster,
    interval: Interval,
    window_len: usize,
}

impl ForecastService {
    pub fn new(
        window_builder: FeatureWindowBuilder,
        interval: Interval,
        window_len: usize,
        horizon: usize,
    ) -> Result<Self, ForecastError> {
        if window_len == 0 {
            return Err(ForecastError::Prediction {
                reason: "window length must be at least 1".to_string(),
            });
        }
        Ok(Self {
            window_builder,
            forecaster: Forecaster::new(horizon)?,
            interval,
            window_len,
        })
    }

    pub async fn predict(
        &self,
        symbol: &str,
        model: &LoadedModel,
    ) -> Result<Vec<Prediction>, ForecastError> {
        let now = Utc::now();
        let len = model.window_len(self.window_len);

        let mut window = self
            .window_builder
            .build(symbol, self.interval, model.schema(), len, now)
            .await?;

        if let Some(scaler) = model.scaler() {
            scaler.transform_window(&mut window)?;
        }

        let raw = self.forecaster.forecast(model.regressor(), &mut window)?;

        let closes: Vec<f64> = match model.scaler() {
            Some(scaler) => raw
                .iter()
                .map(|p| scaler.target.inverse_scalar(*p))
                .collect::<Result<_, _>>()?,
            None => raw,
        };

        let predictions: Vec<Prediction> = future_timestamps(now, self.interval.step(), closes.len())
            .into_iter()
            .zip(closes)
            .map(|(timestamp, close)| Prediction {
                timestamp,
                symbol: symbol.to_string(),
                model: model.name().to_string(),
                close,
            })
            .collect();

        info!(
            "{}: {} produced {} prediction(s), next close {:.2}",
            symbol,
            model.name(),
            predictions.len(),
            predictions.first().map(|p| p.close).unwrap_or(f64::NAN)
        );

        Ok(predictions)
    }

    /// Runs every symbol/model pairing sequentially. A failed pairing is
    /// logged and skipped; siblings proceed.
    pub async fn predict_batch(
        &self,
        jobs: &[(String, &LoadedModel)],
    ) -> Vec<Prediction> {
        let mut all = Vec::new();
        for (symbol, model) in jobs {
            match self.predict(symbol, model).await {
                Ok(mut predictions) => all.append(&mut predictions),
                Err(e) => {
                    error!("Prediction failed for {} using {}: {}", symbol, model.name(), e);
                }
            }
        }
        all
    }
}
