use super::artifact::ModelKind;
use crate::domain::errors::ForecastError;
use crate::domain::forecast::{FeatureSchema, ScalerArtifact};
use crate::domain::ports::Regressor;
use crate::infrastructure::artifact_store::FileArtifactStore;
use tracing::info;

/// A model resolved from persisted artifacts, ready to predict.
///
/// Loading is explicit and caller-controlled: build the handle once, reuse
/// it for as many predictions as needed. The paired scaler (when the model
/// was trained scaled) is validated against the model's schema here, so a
/// mismatched pairing fails at load instead of mis-aligning columns later.
pub struct LoadedModel {
    name: String,
    kind: ModelKind,
    schema: FeatureSchema,
    scaler: Option<ScalerArtifact>,
    regressor: Box<dyn Regressor>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("schema", &self.schema)
            .field("scaler", &self.scaler)
            .field("regressor", &self.regressor.name())
            .finish()
    }
}

impl LoadedModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn scaler(&self) -> Option<&ScalerArtifact> {
        self.scaler.as_ref()
    }

    pub fn regressor(&self) -> &dyn Regressor {
        self.regressor.as_ref()
    }

    /// Window length this model needs, falling back to the configured
    /// default for models that only read the latest row.
    pub fn window_len(&self, default: usize) -> usize {
        self.regressor.window_len().unwrap_or(default)
    }
}

/// Loads `{prefix}_{kind}` plus its scaler when the manifest says the model
/// was trained on scaled features.
pub fn load_model(
    store: &FileArtifactStore,
    prefix: &str,
    kind: ModelKind,
) -> Result<LoadedModel, ForecastError> {
    let name = format!("{}_{}", prefix, kind.as_str());
    let artifact = store.load_model(prefix, kind)?;

    let scaler = if artifact.scaled {
        let scaler = store.load_scaler(prefix)?;
        artifact.schema.validate_against(&scaler.schema)?;
        Some(scaler)
    } else {
        None
    };

    let schema = artifact.schema.clone();
    let regressor = artifact.into_regressor(&name, store.dir())?;

    info!(
        "Loaded model {} ({} schema, scaled={})",
        name,
        schema.describe(),
        scaler.is_some()
    );

    Ok(LoadedModel {
        name,
        kind,
        schema,
        scaler,
        regressor,
    })
}
