use crate::domain::errors::ForecastError;
use crate::domain::forecast::window::FeatureWindow;
use crate::domain::ports::Regressor;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One emitted forecast. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub model: String,
    pub close: f64,
}

/// Multi-step forecaster that feeds the model its own output.
///
/// True future feature values are unknowable, so each step substitutes the
/// prediction into a synthesized row (`FeatureWindow::advance`). Error
/// compounds with every step; production call sites keep the horizon at 1.
#[derive(Debug, Clone, Copy)]
pub struct Forecaster {
    horizon: usize,
}

impl Forecaster {
    pub fn new(horizon: usize) -> Result<Self, ForecastError> {
        if horizon == 0 {
            return Err(ForecastError::Prediction {
                reason: "forecast horizon must be at least 1".to_string(),
            });
        }
        Ok(Self { horizon })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Runs the autoregressive loop, returning one scalar per step in the
    /// space the model operates in (normalized when a scaling boundary is
    /// active). The window ends up advanced by `horizon` steps.
    pub fn forecast(
        &self,
        model: &dyn Regressor,
        window: &mut FeatureWindow,
    ) -> Result<Vec<f64>, ForecastError> {
        if let Some(required) = model.window_len() {
            if window.len() != required {
                return Err(ForecastError::Prediction {
                    reason: format!(
                        "{} requires a window of {} rows, got {}",
                        model.name(),
                        required,
                        window.len()
                    ),
                });
            }
        }

        let mut out = Vec::with_capacity(self.horizon);
        for _ in 0..self.horizon {
            let p = model.predict_next(window)?;
            out.push(p);
            window.advance(p);
        }
        Ok(out)
    }
}

/// Timestamps for K future steps: `from + i * step` for i in 1..=K.
pub fn future_timestamps(from: DateTime<Utc>, step: Duration, count: usize) -> Vec<DateTime<Utc>> {
    (1..=count as i32).map(|i| from + step * i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes the trailing field of the latest row plus a fixed increment.
    struct StepModel {
        increment: f64,
    }

    impl Regressor for StepModel {
        fn predict_next(&self, window: &FeatureWindow) -> Result<f64, ForecastError> {
            Ok(window.latest().last().copied().unwrap_or(0.0) + self.increment)
        }

        fn name(&self) -> &str {
            "step"
        }
    }

    fn window() -> FeatureWindow {
        FeatureWindow::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap()
    }

    #[test]
    fn test_single_step_preserves_window_length() {
        let mut w = window();
        let before = w.len();
        let out = Forecaster::new(1)
            .unwrap()
            .forecast(&StepModel { increment: 1.0 }, &mut w)
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(w.len(), before);
    }

    #[test]
    fn test_multi_step_chains_predictions() {
        let mut w = window();
        let out = Forecaster::new(3)
            .unwrap()
            .forecast(&StepModel { increment: 1.0 }, &mut w)
            .unwrap();
        // each step feeds on the previous output: 6+1, 7+1, 8+1
        assert_eq!(out, vec![7.0, 8.0, 9.0]);
        // the last synthesized row carries the final prediction
        assert_eq!(*w.latest().last().unwrap(), 9.0);
    }

    #[test]
    fn test_zero_horizon_rejected() {
        assert!(Forecaster::new(0).is_err());
    }

    #[test]
    fn test_window_length_requirement_enforced() {
        struct SeqModel;
        impl Regressor for SeqModel {
            fn predict_next(&self, _: &FeatureWindow) -> Result<f64, ForecastError> {
                Ok(0.0)
            }
            fn name(&self) -> &str {
                "seq"
            }
            fn window_len(&self) -> Option<usize> {
                Some(10)
            }
        }

        let mut w = window();
        let err = Forecaster::new(1).unwrap().forecast(&SeqModel, &mut w).unwrap_err();
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_future_timestamps_step_forward() {
        let from = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let stamps = future_timestamps(from, Duration::days(1), 3);
        assert_eq!(stamps.len(), 3);
        assert_eq!(stamps[0], from + Duration::days(1));
        assert_eq!(stamps[2], from + Duration::days(3));
    }
}
