//! Job — build the pipeline from configuration and run it once.

use std::fs::File;
use std::io::{BufReader, BufWriter};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::conf::{IndexerConfig, SinkConfig};
use crate::parser::{CompiledFormat, FallbackClassifier};
use crate::pipeline::{run_extract, DocumentSink, IngestionPipeline, NdjsonSink};

/// Index (or, with `extract_fields`, extract from) the configured input.
pub fn run(config: &IndexerConfig, cancel: CancellationToken) -> Result<()> {
    let primary = CompiledFormat::compile(&config.primary_format)
        .context("Failed to compile primary format")?;

    if let Some(names) = &config.extract_fields {
        return extract(config, &primary, names);
    }

    let fallback = CompiledFormat::compile(&config.fallback_format)
        .context("Failed to compile fallback format")?;
    let classifier = FallbackClassifier::new(primary, fallback);

    let sink: Box<dyn DocumentSink> = match &config.sink {
        SinkConfig::Ndjson { path } => {
            info!("Writing documents to {}", path);
            Box::new(NdjsonSink::create(path).with_context(|| format!("Failed to open sink {}", path))?)
        }
        SinkConfig::Stdout => Box::new(NdjsonSink::new(BufWriter::new(std::io::stdout()))),
    };

    let mut pipeline = IngestionPipeline::new(classifier, sink, config.batch_size)
        .with_cancellation(cancel);

    let summary = pipeline
        .run_file(&config.input_path)
        .with_context(|| format!("Failed to index {}", config.input_path))?;

    info!("Processed {}", summary.processed);
    Ok(())
}

fn extract(config: &IndexerConfig, format: &CompiledFormat, names: &[String]) -> Result<()> {
    let file = File::open(&config.input_path)
        .with_context(|| format!("Failed to open {}", config.input_path))?;
    let out = BufWriter::new(std::io::stdout());

    let summary = run_extract(format, names, BufReader::new(file), &config.input_path, out)
        .with_context(|| format!("Failed to extract from {}", config.input_path))?;

    info!(
        "Extracted {} rows from {} lines ({} skipped)",
        summary.rows, summary.processed, summary.skipped
    );
    Ok(())
}
