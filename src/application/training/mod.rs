pub mod dataset;
pub mod trainer;

pub use dataset::Dataset;
pub use trainer::{TrainedArtifacts, TrainingOptions, TrainingReport, train};
