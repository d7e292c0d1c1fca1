use crate::domain::forecast::Prediction;
use crate::domain::ports::PredictionLog;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only text log, one line per prediction:
/// `{timestamp}, {symbol}, {model}, Predicted close: {value}`
pub struct TextPredictionLog {
    path: PathBuf,
}

impl TextPredictionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn format_line(prediction: &Prediction) -> String {
        format!(
            "{}, {}, {}, Predicted close: {}",
            prediction.timestamp.format(TIMESTAMP_FORMAT),
            prediction.symbol,
            prediction.model,
            prediction.close
        )
    }
}

impl PredictionLog for TextPredictionLog {
    fn append(&self, predictions: &[Prediction]) -> Result<()> {
        if predictions.is_empty() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open prediction log {:?}", self.path))?;

        for prediction in predictions {
            writeln!(file, "{}", Self::format_line(prediction))
                .with_context(|| format!("Failed to write prediction log {:?}", self.path))?;
        }

        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonLogRecord {
    symbol: String,
    model: String,
    predicted_close: f64,
}

/// JSON log variant: one object keyed by date, each date holding the
/// records produced for it. Rewritten whole on every append.
pub struct JsonPredictionLog {
    path: PathBuf,
}

impl JsonPredictionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, Vec<JsonLogRecord>>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read prediction log {:?}", self.path))?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse prediction log {:?}", self.path))
    }
}

impl PredictionLog for JsonPredictionLog {
    fn append(&self, predictions: &[Prediction]) -> Result<()> {
        if predictions.is_empty() {
            return Ok(());
        }

        let mut log = self.load()?;
        for prediction in predictions {
            log.entry(prediction.timestamp.format("%Y-%m-%d").to_string())
                .or_default()
                .push(JsonLogRecord {
                    symbol: prediction.symbol.clone(),
                    model: prediction.model.clone(),
                    predicted_close: prediction.close,
                });
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(&log)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write prediction log {:?}", self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn prediction() -> Prediction {
        Prediction {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            symbol: "BTCUSDT".to_string(),
            model: "btc_forest".to_string(),
            close: 65123.5,
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cryptocast-log-{}-{}", name, std::process::id()))
    }

    #[test]
    fn test_text_line_format() {
        let line = TextPredictionLog::format_line(&prediction());
        assert_eq!(line, "2024-03-01 00:00:00, BTCUSDT, btc_forest, Predicted close: 65123.5");
    }

    #[test]
    fn test_text_log_appends() {
        let path = temp_path("text");
        let _ = std::fs::remove_file(&path);

        let log = TextPredictionLog::new(&path);
        log.append(&[prediction()]).unwrap();
        log.append(&[prediction()]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_json_log_keys_by_date() {
        let path = temp_path("json");
        let _ = std::fs::remove_file(&path);

        let log = JsonPredictionLog::new(&path);
        log.append(&[prediction()]).unwrap();
        log.append(&[prediction()]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.is_object());
        assert_eq!(value["2024-03-01"].as_array().unwrap().len(), 2);
        let _ = std::fs::remove_file(&path);
    }
}
