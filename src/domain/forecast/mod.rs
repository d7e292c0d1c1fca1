pub mod forecaster;
pub mod scaler;
pub mod schema;
pub mod window;

pub use forecaster::{Forecaster, Prediction, future_timestamps};
pub use scaler::{MinMaxScaler, ScalerArtifact};
pub use schema::{FeatureField, FeatureSchema};
pub use window::FeatureWindow;
