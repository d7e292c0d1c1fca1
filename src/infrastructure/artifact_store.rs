use crate::application::model::artifact::{ModelArtifact, ModelKind};
use crate::domain::errors::ForecastError;
use crate::domain::forecast::ScalerArtifact;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// Model and scaler artifacts as JSON blobs on disk, keyed
/// `{prefix}_{kind}.json` and `{prefix}_scaler.json`.
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn model_path(&self, prefix: &str, kind: ModelKind) -> PathBuf {
        self.dir.join(format!("{}_{}.json", prefix, kind.as_str()))
    }

    pub fn scaler_path(&self, prefix: &str) -> PathBuf {
        self.dir.join(format!("{}_scaler.json", prefix))
    }

    pub fn save_model(
        &self,
        prefix: &str,
        kind: ModelKind,
        artifact: &ModelArtifact,
    ) -> Result<PathBuf, ForecastError> {
        self.write(self.model_path(prefix, kind), artifact)
    }

    pub fn load_model(&self, prefix: &str, kind: ModelKind) -> Result<ModelArtifact, ForecastError> {
        self.read(self.model_path(prefix, kind))
    }

    pub fn save_scaler(
        &self,
        prefix: &str,
        artifact: &ScalerArtifact,
    ) -> Result<PathBuf, ForecastError> {
        self.write(self.scaler_path(prefix), artifact)
    }

    pub fn load_scaler(&self, prefix: &str) -> Result<ScalerArtifact, ForecastError> {
        self.read(self.scaler_path(prefix))
    }

    fn write<T: Serialize>(&self, path: PathBuf, value: &T) -> Result<PathBuf, ForecastError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ForecastError::ArtifactDecode {
                path: path.clone(),
                reason: format!("failed to create artifact directory: {}", e),
            })?;
        }

        let file = File::create(&path).map_err(|e| ForecastError::ArtifactDecode {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        serde_json::to_writer(file, value).map_err(|e| ForecastError::ArtifactDecode {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        info!("Saved artifact to {:?}", path);
        Ok(path)
    }

    fn read<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T, ForecastError> {
        if !path.exists() {
            return Err(ForecastError::ArtifactNotFound { path });
        }

        let file = File::open(&path).map_err(|e| ForecastError::ArtifactDecode {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| ForecastError::ArtifactDecode {
            path,
            reason: e.to_string(),
        })
    }
}
