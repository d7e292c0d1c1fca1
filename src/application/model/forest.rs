use super::artifact::ForestInner;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::FeatureWindow;
use crate::domain::ports::Regressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

/// Tree-ensemble regressor over the latest window row.
pub struct ForestModel {
    name: String,
    inner: ForestInner,
}

impl ForestModel {
    pub fn new(name: &str, inner: ForestInner) -> Self {
        Self {
            name: name.to_string(),
            inner,
        }
    }
}

impl Regressor for ForestModel {
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
                reason: format!("forest prediction failed: {}", e),
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
