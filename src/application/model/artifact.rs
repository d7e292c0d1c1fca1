use crate::domain::errors::ForecastError;
use crate::domain::forecast::FeatureSchema;
use crate::domain::ports::Regressor;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::LinearRegression;
use std::path::{Path, PathBuf};

use super::forest::ForestModel;
use super::linear::LinearModel;
use super::recurrent::OnnxModel;

pub type LinearInner = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type ForestInner = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// The model family, resolved once from configuration strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Linear,
    Forest,
    Recurrent,
}

impl ModelKind {
    /// The suffix used in artifact filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::Forest => "forest",
            ModelKind::Recurrent => "lstm",
        }
    }
}

impl std::str::FromStr for ModelKind {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(ModelKind::Linear),
            "forest" | "rf" => Ok(ModelKind::Forest),
            "lstm" | "rnn" | "recurrent" => Ok(ModelKind::Recurrent),
            other => Err(ForecastError::UnsupportedModelKind {
                name: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ModelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family-tagged model payload. Tabular models serialize inline; recurrent
/// models reference an ONNX blob next to the manifest.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear {
        model: LinearInner,
    },
    Forest {
        model: ForestInner,
    },
    Recurrent {
        weights: PathBuf,
        sequence_length: usize,
    },
}

impl ModelSpec {
    pub fn kind(&self) -> ModelKind {
        match self {
            ModelSpec::Linear { .. } => ModelKind::Linear,
            ModelSpec::Forest { .. } => ModelKind::Forest,
            ModelSpec::Recurrent { .. } => ModelKind::Recurrent,
        }
    }
}

/// Persisted model manifest. The embedded schema and the `scaled` flag
/// replicate, at inference time, the exact configuration chosen at
/// training time.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema: FeatureSchema,
    pub scaled: bool,
    pub spec: ModelSpec,
}

impl ModelArtifact {
    /// Resolves the artifact into its runtime predictor. Recurrent weights
    /// paths are taken relative to `base_dir` unless absolute.
    pub fn into_regressor(self, name: &str, base_dir: &Path) -> Result<Box<dyn Regressor>, ForecastError> {
        match self.spec {
            ModelSpec::Linear { model } => Ok(Box::new(LinearModel::new(name, model))),
            ModelSpec::Forest { model } => Ok(Box::new(ForestModel::new(name, model))),
            ModelSpec::Recurrent {
                weights,
                sequence_length,
            } => {
                let path = if weights.is_absolute() {
                    weights
                } else {
                    base_dir.join(weights)
                };
                Ok(Box::new(OnnxModel::load(name, &path, sequence_length)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(ModelKind::from_str("linear").unwrap(), ModelKind::Linear);
        assert_eq!(ModelKind::from_str("Forest").unwrap(), ModelKind::Forest);
        assert_eq!(ModelKind::from_str("lstm").unwrap(), ModelKind::Recurrent);
        assert_eq!(ModelKind::from_str("rnn").unwrap(), ModelKind::Recurrent);
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let err = ModelKind::from_str("xgboost").unwrap_err();
        assert!(matches!(err, ForecastError::UnsupportedModelKind { .. }));
        assert!(err.to_string().contains("xgboost"));
    }

    #[test]
    fn test_recurrent_manifest_round_trips() {
        let artifact = ModelArtifact {
            schema: FeatureSchema::full(),
            scaled: true,
            spec: ModelSpec::Recurrent {
                weights: PathBuf::from("btc_lstm.onnx"),
                sequence_length: 10,
            },
        };

        let json = serde_json::to_string(&artifact).unwrap();
        let back: ModelArtifact = serde_json::from_str(&json).unwrap();
        assert!(back.scaled);
        assert_eq!(back.spec.kind(), ModelKind::Recurrent);
        assert_eq!(back.schema, FeatureSchema::full());
    }
}
