use super::artifact::LinearInner;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::FeatureWindow;
use crate::domain::ports::Regressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Ordinary least-squares regressor over the latest window row.
pub struct LinearModel {
    name: String,
    inner: LinearInner,
}

impl LinearModel {
    pub fn new(name: &str, inner: LinearInner) -> Self {
        Self {
            name: name.to_string(),
            inner,
        }
    }
}

impl Regressor for LinearModel {
    fn predict_next(&self, window: &FeatureWindow) -> Result<f64, ForecastError> {
        let input = DenseMatrix::from_2d_vec(&vec![window.latest().to_vec()]).map_err(|e| {
            ForecastError::Prediction {
                reason: format!("matrix creation failed: {}", e),
            }
        })?;

        let predictions = self
            .inner
            .predict(&input)
            .map_err(|e| ForecastError::Prediction {
                reason: format!("linear prediction failed: {}", e),
            })?;

        predictions
            .first()
            .copied()
            .ok_or_else(|| ForecastError::Prediction {
                reason: "no prediction returned".to_string(),
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}
