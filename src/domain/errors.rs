use std::path::PathBuf;
use thiserror::Error;

/// Errors raised along the fetch -> window -> predict pipeline.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("Data fetch failed for {symbol}: {source}")]
    DataFetch {
        symbol: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("No usable candle data for {symbol}: needed {needed} rows, got {got}")]
    EmptyData {
        symbol: String,
        needed: usize,
        got: usize,
    },

    #[error("Artifact not found: {path}")]
    ArtifactNotFound { path: PathBuf },

    #[error("Failed to decode artifact {path}: {reason}")]
    ArtifactDecode { path: PathBuf, reason: String },

    #[error("Feature schema mismatch: model expects {expected}, got {actual}")]
    FeatureMismatch { expected: String, actual: String },

    #[error("Unsupported model kind: {name}")]
    UnsupportedModelKind { name: String },

    #[error("Prediction failed: {reason}")]
    Prediction { reason: String },
}
