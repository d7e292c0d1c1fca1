use crate::domain::errors::ForecastError;
use crate::domain::forecast::schema::FeatureSchema;
use crate::domain::forecast::window::FeatureWindow;
use serde::{Deserialize, Serialize};

/// Per-column min-max transform fitted once at training time.
///
/// Maps each column onto [0, 1] over its training range. Columns with zero
/// range transform to 0.0, matching the behavior the original training
/// stack exhibited on constant columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl MinMaxScaler {
    /// Fits column ranges over `rows`. All rows must share one width.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ForecastError> {
        let width = match rows.first() {
            Some(r) if !r.is_empty() => r.len(),
            _ => {
                return Err(ForecastError::Prediction {
                    reason: "cannot fit scaler on empty data".to_string(),
                });
            }
        };

        let mut mins = vec![f64::INFINITY; width];
        let mut maxs = vec![f64::NEG_INFINITY; width];
        for row in rows {
            if row.len() != width {
                return Err(ForecastError::Prediction {
                    reason: format!(
                        "ragged scaler input: expected width {}, found {}",
                        width,
                        row.len()
                    ),
                });
            }
            for (i, v) in row.iter().enumerate() {
                mins[i] = mins[i].min(*v);
                maxs[i] = maxs[i].max(*v);
            }
        }

        Ok(Self { mins, maxs })
    }

    /// Convenience for fitting a single-column scaler over scalar values.
    pub fn fit_column(values: &[f64]) -> Result<Self, ForecastError> {
        let rows: Vec<Vec<f64>> = values.iter().map(|v| vec![*v]).collect();
        Self::fit(&rows)
    }

    pub fn width(&self) -> usize {
        self.mins.len()
    }

    pub fn transform_in_place(&self, row: &mut [f64]) -> Result<(), ForecastError> {
        self.check_width(row.len())?;
        for (i, v) in row.iter_mut().enumerate() {
            let range = self.maxs[i] - self.mins[i];
            *v = if range == 0.0 {
                0.0
            } else {
                (*v - self.mins[i]) / range
            };
        }
        Ok(())
    }

    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError> {
        let mut out = row.to_vec();
        self.transform_in_place(&mut out)?;
        Ok(out)
    }

    pub fn inverse(&self, row: &[f64]) -> Result<Vec<f64>, ForecastError> {
        self.check_width(row.len())?;
        Ok(row
            .iter()
            .enumerate()
            .map(|(i, v)| self.mins[i] + v * (self.maxs[i] - self.mins[i]))
            .collect())
    }

    /// Single-column shortcut used for the prediction target.
    pub fn transform_scalar(&self, value: f64) -> Result<f64, ForecastError> {
        Ok(self.transform(&[value])?[0])
    }

    pub fn inverse_scalar(&self, value: f64) -> Result<f64, ForecastError> {
        Ok(self.inverse(&[value])?[0])
    }

    fn check_width(&self, got: usize) -> Result<(), ForecastError> {
        if got != self.width() {
            return Err(ForecastError::FeatureMismatch {
                expected: format!("{} scaled columns", self.width()),
                actual: format!("{} columns", got),
            });
        }
        Ok(())
    }
}

/// The fitted scaling boundary persisted next to a model.
///
/// `features` normalizes whole rows, `target` the predicted close. The
/// embedded schema ties the scaler to the layout it was fitted on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub schema: FeatureSchema,
    pub features: MinMaxScaler,
    pub target: MinMaxScaler,
}

impl ScalerArtifact {
    /// Normalizes every row of the window in place.
    pub fn transform_window(&self, window: &mut FeatureWindow) -> Result<(), ForecastError> {
        if window.width() != self.features.width() {
            return Err(ForecastError::FeatureMismatch {
                expected: format!("{} ({} columns)", self.schema.describe(), self.features.width()),
                actual: format!("window of {} columns", window.width()),
            });
        }
        for row in window.rows_mut() {
            self.features.transform_in_place(row)?;
        }
        Ok(())
    }
}
