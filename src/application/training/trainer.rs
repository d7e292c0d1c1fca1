use super::dataset::Dataset;
use crate::application::model::artifact::{ModelArtifact, ModelKind, ModelSpec};
use crate::domain::errors::ForecastError;
use crate::domain::forecast::{FeatureSchema, MinMaxScaler, ScalerArtifact};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use tracing::info;

#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub kind: ModelKind,
    /// Fit and persist a scaling boundary; the inference side replicates
    /// the choice from the manifest.
    pub scaled: bool,
    /// Train fraction for the chronological holdout; None trains on 100%.
    pub split: Option<f64>,
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_split: usize,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            kind: ModelKind::Forest,
            scaled: true,
            split: Some(0.8),
            n_trees: 100,
            max_depth: 10,
            min_split: 5,
        }
    }
}

/// Holdout evaluation in price units. None when trained without a split.
#[derive(Debug, Clone, Default)]
pub struct TrainingReport {
    pub train_samples: usize,
    pub test_samples: usize,
    pub rmse: Option<f64>,
    pub mae: Option<f64>,
    pub r2: Option<f64>,
}

#[derive(Debug)]
pub struct TrainedArtifacts {
    pub model: ModelArtifact,
    pub scaler: Option<ScalerArtifact>,
}

/// Fits the scaling boundary (training slice only) and the requested model
/// family, then evaluates on the holdout.
pub fn train(
    dataset: &Dataset,
    schema: &FeatureSchema,
    opts: &TrainingOptions,
) -> Result<(TrainedArtifacts, TrainingReport), ForecastError> {
    if dataset.is_empty() {
        return Err(ForecastError::Prediction {
            reason: "training dataset is empty".to_string(),
        });
    }

    if opts.kind == ModelKind::Recurrent {
        return Err(ForecastError::UnsupportedModelKind {
            name: "recurrent (train externally, import the ONNX graph)".to_string(),
        });
    }

    if let Some(row) = dataset.rows.first() {
        if row.len() != schema.width() {
            return Err(ForecastError::FeatureMismatch {
                expected: schema.describe(),
                actual: format!("dataset rows of {} columns", row.len()),
            });
        }
    }

    let (train_set, test_set) = match opts.split {
        Some(fraction) => dataset.split(fraction),
        None => (dataset.clone(), Dataset { rows: Vec::new(), targets: Vec::new() }),
    };

    if train_set.is_empty() {
        return Err(ForecastError::Prediction {
            reason: "training split left no samples".to_string(),
        });
    }

    let scaler = if opts.scaled {
        Some(ScalerArtifact {
            schema: schema.clone(),
            features: MinMaxScaler::fit(&train_set.rows)?,
            target: MinMaxScaler::fit_column(&train_set.targets)?,
        })
    } else {
        None
    };

    let (x_train, y_train) = prepare(&train_set, scaler.as_ref())?;

    info!(
        "Training {} on {} samples ({}, scaled={})",
        opts.kind,
        train_set.len(),
        schema.describe(),
        opts.scaled
    );

    let x_matrix = DenseMatrix::from_2d_vec(&x_train).map_err(|e| ForecastError::Prediction {
        reason: format!("matrix creation failed: {}", e),
    })?;

    let spec = match opts.kind {
        ModelKind::Linear => {
            let model =
                LinearRegression::fit(&x_matrix, &y_train, LinearRegressionParameters::default())
                    .map_err(|e| ForecastError::Prediction {
                        reason: format!("training failed: {}", e),
                    })?;
            ModelSpec::Linear { model }
        }
        ModelKind::Forest => {
            let params = RandomForestRegressorParameters::default()
                .with_n_trees(opts.n_trees)
                .with_max_depth(opts.max_depth)
                .with_min_samples_split(opts.min_split);
            let model = RandomForestRegressor::fit(&x_matrix, &y_train, params).map_err(|e| {
                ForecastError::Prediction {
                    reason: format!("training failed: {}", e),
                }
            })?;
            ModelSpec::Forest { model }
        }
        ModelKind::Recurrent => unreachable!("rejected above"),
    };

    let mut report = TrainingReport {
        train_samples: train_set.len(),
        test_samples: test_set.len(),
        ..Default::default()
    };

    if !test_set.is_empty() {
        let predicted = predict_prices(&spec, &test_set.rows, scaler.as_ref())?;
        let (rmse, mae, r2) = evaluate(&predicted, &test_set.targets);
        info!(
            "Holdout (n={}): RMSE={:.4}, MAE={:.4}, R2={:.4}",
            test_set.len(),
            rmse,
            mae,
            r2
        );
        report.rmse = Some(rmse);
        report.mae = Some(mae);
        report.r2 = Some(r2);
    }

    let artifacts = TrainedArtifacts {
        model: ModelArtifact {
            schema: schema.clone(),
            scaled: opts.scaled,
            spec,
        },
        scaler,
    };

    Ok((artifacts, report))
}

/// Applies the scaling boundary to a training slice.
fn prepare(
    set: &Dataset,
    scaler: Option<&ScalerArtifact>,
) -> Result<(Vec<Vec<f64>>, Vec<f64>), ForecastError> {
    match scaler {
        Some(s) => {
            let rows = set
                .rows
                .iter()
                .map(|r| s.features.transform(r))
                .collect::<Result<Vec<_>, _>>()?;
            let targets = set
                .targets
                .iter()
                .map(|t| s.target.transform_scalar(*t))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((rows, targets))
        }
        None => Ok((set.rows.clone(), set.targets.clone())),
    }
}

/// Predicts test rows and maps the outputs back to price units.
fn predict_prices(
    spec: &ModelSpec,
    rows: &[Vec<f64>],
    scaler: Option<&ScalerArtifact>,
) -> Result<Vec<f64>, ForecastError> {
    let rows: Vec<Vec<f64>> = match scaler {
        Some(s) => rows
            .iter()
            .map(|r| s.features.transform(r))
            .collect::<Result<_, _>>()?,
        None => rows.to_vec(),
    };

    let matrix = DenseMatrix::from_2d_vec(&rows).map_err(|e| ForecastError::Prediction {
        reason: format!("matrix creation failed: {}", e),
    })?;

    let raw = match spec {
        ModelSpec::Linear { model } => model.predict(&matrix),
        ModelSpec::Forest { model } => model.predict(&matrix),
        ModelSpec::Recurrent { .. } => {
            return Err(ForecastError::Prediction {
                reason: "recurrent models are not evaluated in-crate".to_string(),
            });
        }
    }
    .map_err(|e| ForecastError::Prediction {
        reason: format!("prediction failed: {}", e),
    })?;

    match scaler {
        Some(s) => raw.iter().map(|p| s.target.inverse_scalar(*p)).collect(),
        None => Ok(raw),
    }
}

fn evaluate(predicted: &[f64], actual: &[f64]) -> (f64, f64, f64) {
    let n = predicted.len() as f64;
    let sq_err: f64 = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, t)| (p - t).powi(2))
        .sum();
    let rmse = (sq_err / n).sqrt();
    let mae = predicted
        .iter()
        .zip(actual.iter())
        .map(|(p, t)| (p - t).abs())
        .sum::<f64>()
        / n;
    let mean_y = actual.iter().sum::<f64>() / n;
    let var_y = actual.iter().map(|t| (t - mean_y).powi(2)).sum::<f64>() / n;
    let r2 = if var_y > 0.0 {
        1.0 - (sq_err / n) / var_y
    } else {
        0.0
    };
    (rmse, mae, r2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_dataset(n: usize) -> Dataset {
        // target = 2 * x0 + 10, exactly learnable by OLS; the remaining
        // columns are deterministic noise with full column rank
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| {
                vec![
                    i as f64,
                    ((i * 7) % 11) as f64,
                    ((i * 13) % 17) as f64,
                    ((i * 3) % 19) as f64,
                    ((i * 23) % 29) as f64,
                    ((i * 5) % 31) as f64,
                    ((i * 37) % 41) as f64,
                ]
            })
            .collect();
        let targets = rows.iter().map(|r| 2.0 * r[0] + 10.0).collect();
        Dataset { rows, targets }
    }

    #[test]
    fn test_linear_fit_recovers_relationship() {
        let opts = TrainingOptions {
            kind: ModelKind::Linear,
            scaled: false,
            split: Some(0.8),
            ..Default::default()
        };
        let (artifacts, report) =
            train(&linear_dataset(50), &FeatureSchema::compact(), &opts).unwrap();

        assert!(!artifacts.model.scaled);
        assert!(artifacts.scaler.is_none());
        assert!(report.rmse.unwrap() < 1e-6, "rmse = {:?}", report.rmse);
    }

    #[test]
    fn test_scaled_training_persists_boundary() {
        let opts = TrainingOptions {
            kind: ModelKind::Linear,
            scaled: true,
            split: Some(0.8),
            ..Default::default()
        };
        let (artifacts, report) =
            train(&linear_dataset(50), &FeatureSchema::compact(), &opts).unwrap();

        assert!(artifacts.model.scaled);
        let scaler = artifacts.scaler.expect("scaler artifact");
        assert_eq!(scaler.schema, FeatureSchema::compact());
        // metrics are reported in price units either way
        assert!(report.rmse.unwrap() < 1.0, "rmse = {:?}", report.rmse);
    }

    #[test]
    fn test_no_split_skips_evaluation() {
        let opts = TrainingOptions {
            kind: ModelKind::Linear,
            scaled: false,
            split: None,
            ..Default::default()
        };
        let (_, report) = train(&linear_dataset(20), &FeatureSchema::compact(), &opts).unwrap();
        assert_eq!(report.test_samples, 0);
        assert!(report.rmse.is_none());
    }

    #[test]
    fn test_recurrent_training_is_unsupported() {
        let opts = TrainingOptions {
            kind: ModelKind::Recurrent,
            ..Default::default()
        };
        let err = train(&linear_dataset(20), &FeatureSchema::compact(), &opts).unwrap_err();
        assert!(matches!(err, ForecastError::UnsupportedModelKind { .. }));
    }
}
