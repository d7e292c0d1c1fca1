pub mod artifact;
pub mod forest;
pub mod linear;
pub mod loader;
pub mod recurrent;

pub use artifact::{ModelArtifact, ModelKind, ModelSpec};
pub use forest::ForestModel;
pub use linear::LinearModel;
pub use loader::{LoadedModel, load_model};
pub use recurrent::OnnxModel;
