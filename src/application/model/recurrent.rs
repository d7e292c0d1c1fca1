use crate::domain::errors::ForecastError;
use crate::domain::forecast::FeatureWindow;
use crate::domain::ports::Regressor;
use ort::session::Session;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Recurrent network executed through ONNX Runtime.
///
/// The graph is trained elsewhere and imported; input shape is
/// `[1, sequence_length, width]`, oldest row first.
#[derive(Debug)]
pub struct OnnxModel {
    name: String,
    session: Mutex<Session>,
    sequence_length: usize,
}

impl OnnxModel {
    pub fn load(name: &str, path: &Path, sequence_length: usize) -> Result<Self, ForecastError> {
        if !path.exists() {
            return Err(ForecastError::ArtifactNotFound {
                path: path.to_path_buf(),
            });
        }

        let session = Session::builder()
            .and_then(|mut b| b.commit_from_file(path))
            .map_err(|e| ForecastError::ArtifactDecode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!("Loaded ONNX model {} from {:?}", name, path);

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            sequence_length,
        })
    }
}

impl Regressor for OnnxModel {
    fn predict_next(&self, window: &FeatureWindow) -> Result<f64, ForecastError> {
        if window.len() != self.sequence_length {
            return Err(ForecastError::Prediction {
                reason: format!(
                    "{} requires {} rows, got {}",
                    self.name,
                    self.sequence_length,
                    window.len()
                ),
            });
        }

        let flat = window.flatten_f32();
        let shape = vec![1, self.sequence_length, window.width()];

        let input_value =
            ort::value::Value::from_array((shape.as_slice(), flat)).map_err(|e| {
                ForecastError::Prediction {
                    reason: format!("input tensor creation failed: {}", e),
                }
            })?;

        let mut session = self.session.lock().map_err(|e| ForecastError::Prediction {
            reason: format!("session lock poisoned: {}", e),
        })?;

        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(|e| ForecastError::Prediction {
                reason: format!("onnx run failed: {}", e),
            })?;

        let output_value = outputs
            .iter()
            .next()
            .map(|(_, v)| v)
            .ok_or_else(|| ForecastError::Prediction {
                reason: "no output tensor".to_string(),
            })?;

        let data = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| ForecastError::Prediction {
                reason: format!("output extraction failed: {}", e),
            })?;

        data.1
            .iter()
            .next()
            .map(|v| *v as f64)
            .ok_or_else(|| ForecastError::Prediction {
                reason: "empty output tensor".to_string(),
            })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn window_len(&self) -> Option<usize> {
        Some(self.sequence_length)
    }
}
