//! Conf module — configuration model and loading.

pub mod model;
pub mod load;

pub use model::{IndexerConfig, LogFormat, LoggingConfig, SinkConfig};
