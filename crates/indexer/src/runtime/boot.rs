//! Boot — logging init and configuration load.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::conf::{IndexerConfig, LogFormat, LoggingConfig};

/// Thread-local subscriber so config loading can log before the real one exists.
pub fn init_logging_basic() -> tracing::subscriber::DefaultGuard {
    let subscriber = fmt()
        .with_env_filter(EnvFilter::new("indexer=info"))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Initialise the global tracing subscriber. Logs go to stderr so stdout stays
/// free for NDJSON and extract output.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Load and validate configuration, then install the configured subscriber.
pub fn boot() -> Result<IndexerConfig> {
    let basic = init_logging_basic();

    let config = IndexerConfig::load().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    // Release the thread-local default before installing the global one
    drop(basic);
    init_logging(&config.logging);

    info!("Starting indexer v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {}", config.input_path);
    info!("Primary format: {}", config.primary_format);
    info!("Fallback format: {}", config.fallback_format);

    Ok(config)
}
