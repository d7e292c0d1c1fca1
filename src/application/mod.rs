pub mod forecast_service;
pub mod model;
pub mod training;
pub mod window_builder;

pub use forecast_service::ForecastService;
pub use window_builder::FeatureWindowBuilder;
