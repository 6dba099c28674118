//! Sink — where finished batches go.
//!
//! The store's transport lives behind [`DocumentSink`]; the pipeline only
//! decides when to hand a batch over and which commit to ask for.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::document::OutputRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitKind {
    /// Make added records visible; durability not required.
    Soft,
    /// Make added records durable.
    Hard,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Rejected by store: {0}")]
    Rejected(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait DocumentSink {
    fn bulk_add(&mut self, records: &[OutputRecord]) -> Result<(), SinkError>;
    fn commit(&mut self, kind: CommitKind) -> Result<(), SinkError>;
}

impl<S: DocumentSink + ?Sized> DocumentSink for Box<S> {
    fn bulk_add(&mut self, records: &[OutputRecord]) -> Result<(), SinkError> {
        (**self).bulk_add(records)
    }

    fn commit(&mut self, kind: CommitKind) -> Result<(), SinkError> {
        (**self).commit(kind)
    }
}

/// Writes one JSON document per line.
pub struct NdjsonSink<W: Write> {
    writer: W,
    /// Handle used to fsync on hard commits (file-backed sinks only)
    sync: Option<File>,
}

impl NdjsonSink<BufWriter<File>> {
    /// Append to `path`, creating it if needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
        let sync = file.try_clone()?;
        Ok(Self {
            writer: BufWriter::new(file),
            sync: Some(sync),
        })
    }
}

impl<W: Write> NdjsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            sync: None,
        }
    }
}

impl<W: Write> DocumentSink for NdjsonSink<W> {
    fn bulk_add(&mut self, records: &[OutputRecord]) -> Result<(), SinkError> {
        for record in records {
            serde_json::to_writer(&mut self.writer, record)?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    fn commit(&mut self, kind: CommitKind) -> Result<(), SinkError> {
        self.writer.flush()?;
        if let (CommitKind::Hard, Some(file)) = (kind, self.sync.as_ref()) {
            file.sync_all()?;
        }
        Ok(())
    }
}

/// Calls a sink received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    BulkAdd(usize),
    Commit(CommitKind),
}

/// Keeps everything in memory. Used by tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<OutputRecord>,
    pub events: Vec<SinkEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentSink for MemorySink {
    fn bulk_add(&mut self, records: &[OutputRecord]) -> Result<(), SinkError> {
        self.records.extend_from_slice(records);
        self.events.push(SinkEvent::BulkAdd(records.len()));
        Ok(())
    }

    fn commit(&mut self, kind: CommitKind) -> Result<(), SinkError> {
        self.events.push(SinkEvent::Commit(kind));
        Ok(())
    }
}
