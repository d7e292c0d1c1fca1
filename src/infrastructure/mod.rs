pub mod artifact_store;
pub mod binance;
pub mod candle_csv;
pub mod http_client_factory;
pub mod mock;
pub mod prediction_log;
