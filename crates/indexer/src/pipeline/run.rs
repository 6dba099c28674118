//! Run — drives one source through classify -> map -> batch -> sink.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::sink::{CommitKind, DocumentSink, SinkError};
use crate::document::{DocumentMapper, OutputRecord};
use crate::parser::{Classification, FallbackClassifier, MAX_LINE_SIZE};

pub const DEFAULT_BATCH_SIZE: usize = 2000;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Exception reading {name}: {source}")]
    Source {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Exception during {operation} at line {line}: {source}")]
    Sink {
        operation: &'static str,
        line: u64,
        #[source]
        source: SinkError,
    },

    #[error("Exception while committing: {0}")]
    FinalCommit(#[source] SinkError),

    #[error("Exception writing output: {0}")]
    Output(#[source] std::io::Error),

    #[error("Run cancelled after {processed} lines")]
    Cancelled { processed: u64 },
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Lines read from the source
    pub processed: u64,
    /// Matched the primary format
    pub valid: u64,
    /// Matched only the fallback format
    pub invalid: u64,
    /// Matched neither format
    pub dropped: u64,
    /// Matched a format but a field value could not be interpreted
    pub unmappable: u64,
    /// Records handed to the sink
    pub indexed: u64,
    pub batches: u64,
}

pub struct IngestionPipeline<S: DocumentSink> {
    classifier: FallbackClassifier,
    mapper: DocumentMapper,
    sink: S,
    batch_size: usize,
    cancel: CancellationToken,
    summary: RunSummary,
}

impl<S: DocumentSink> IngestionPipeline<S> {
    pub fn new(classifier: FallbackClassifier, sink: S, batch_size: usize) -> Self {
        Self {
            classifier,
            mapper: DocumentMapper::new(),
            sink,
            batch_size: batch_size.max(1),
            cancel: CancellationToken::new(),
            summary: RunSummary::default(),
        }
    }

    /// Stop between lines once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Counters of the current (or last) run, also available after a failed run.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Open `path` and run it through the pipeline.
    pub fn run_file(&mut self, path: impl AsRef<Path>) -> Result<RunSummary, IngestError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|source| IngestError::Source {
            name: name.clone(),
            source,
        })?;
        self.run(BufReader::new(file), &name)
    }

    /// Process every line of `source`.
    ///
    /// A hard commit is attempted on every exit path. When the run already
    /// failed, a failing hard commit is logged and the original error returned.
    pub fn run<R: BufRead>(&mut self, source: R, name: &str) -> Result<RunSummary, IngestError> {
        self.summary = RunSummary::default();
        info!("Indexing {} (batch size {})", name, self.batch_size);
        debug!(
            "Primary pattern {}, fallback pattern {}",
            self.classifier.primary().pattern(),
            self.classifier.fallback().pattern()
        );

        // `source` is consumed here and closed before the final commit
        let outcome = self.ingest(source, name);
        let committed = self.sink.commit(CommitKind::Hard);

        match (outcome, committed) {
            (Ok(()), Ok(())) => {
                info!(
                    "Processed {} lines from {}: valid={}, invalid={}, dropped={}, unmappable={}, batches={}",
                    self.summary.processed,
                    name,
                    self.summary.valid,
                    self.summary.invalid,
                    self.summary.dropped,
                    self.summary.unmappable,
                    self.summary.batches
                );
                Ok(self.summary.clone())
            }
            (Ok(()), Err(e)) => {
                error!("Final commit failed for {}: {}", name, e);
                Err(IngestError::FinalCommit(e))
            }
            (Err(e), committed) => {
                if let Err(commit_err) = committed {
                    error!("Final commit failed after run error: {}", commit_err);
                }
                error!(
                    "Indexing {} failed after {} lines ({} dropped): {}",
                    name, self.summary.processed, self.summary.dropped, e
                );
                Err(e)
            }
        }
    }

    fn ingest<R: BufRead>(&mut self, mut reader: R, name: &str) -> Result<(), IngestError> {
        let mut batch: Vec<OutputRecord> = Vec::with_capacity(self.batch_size);
        let mut buf = Vec::new();

        loop {
            if self.cancel.is_cancelled() {
                return Err(IngestError::Cancelled { processed: self.summary.processed });
            }

            buf.clear();
            let n = reader
                .by_ref()
                .take(MAX_LINE_SIZE as u64 + 1)
                .read_until(b'\n', &mut buf)
                .map_err(|source| IngestError::Source {
                    name: name.to_string(),
                    source,
                })?;
            if n == 0 {
                break;
            }

            if buf.len() > MAX_LINE_SIZE && buf.last() != Some(&b'\n') {
                let rest = discard_line(&mut reader).map_err(|source| IngestError::Source {
                    name: name.to_string(),
                    source,
                })?;
                self.summary.processed += 1;
                self.summary.dropped += 1;
                warn!(
                    "Dropping line {}: {} bytes exceeds the {} byte limit",
                    self.summary.processed,
                    buf.len() as u64 + rest,
                    MAX_LINE_SIZE
                );
                continue;
            }

            strip_line_ending(&mut buf);
            let line = String::from_utf8_lossy(&buf);
            self.summary.processed += 1;

            if let Some(record) = self.process(&line) {
                batch.push(record);
                if batch.len() >= self.batch_size {
                    self.flush(&mut batch, true)?;
                }
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, false)?;
        }
        Ok(())
    }

    fn process(&mut self, line: &str) -> Option<OutputRecord> {
        let line_no = self.summary.processed;

        let mapped = match self.classifier.classify(line) {
            Classification::Valid(fields) => {
                self.summary.valid += 1;
                self.mapper.map_valid(line, &fields)
            }
            Classification::Invalid { fields, primary } => {
                debug!("Line {} failed primary format, using fallback: {}", line_no, primary);
                self.summary.invalid += 1;
                self.mapper.map_fallback(line, &fields)
            }
            Classification::Dropped { secondary, .. } => {
                warn!("Dropping line {}: {}", line_no, secondary);
                self.summary.dropped += 1;
                return None;
            }
        };

        match mapped {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping line {}: {}", line_no, e);
                self.summary.unmappable += 1;
                None
            }
        }
    }

    fn flush(&mut self, batch: &mut Vec<OutputRecord>, soft_commit: bool) -> Result<(), IngestError> {
        let line = self.summary.processed;
        if self.cancel.is_cancelled() {
            return Err(IngestError::Cancelled { processed: line });
        }

        self.sink.bulk_add(batch).map_err(|source| IngestError::Sink {
            operation: "bulk add",
            line,
            source,
        })?;
        self.summary.batches += 1;
        self.summary.indexed += batch.len() as u64;
        debug!("Flushed {} records at line {}", batch.len(), line);
        batch.clear();

        if soft_commit {
            self.sink.commit(CommitKind::Soft).map_err(|source| IngestError::Sink {
                operation: "soft commit",
                line,
                source,
            })?;
        }
        Ok(())
    }
}

/// Consume the remainder of the current line, terminator included.
fn discard_line<R: BufRead>(reader: &mut R) -> std::io::Result<u64> {
    let mut skipped = 0;
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(skipped);
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(i) => {
                reader.consume(i + 1);
                return Ok(skipped + i as u64 + 1);
            }
            None => {
                let len = available.len();
                reader.consume(len);
                skipped += len as u64;
            }
        }
    }
}

fn strip_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}
