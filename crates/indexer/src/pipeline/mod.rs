//! Pipeline module — line-by-line ingestion with bounded batching.

pub mod run;
pub mod extract;
pub mod sink;

pub use run::{IngestError, IngestionPipeline, RunSummary, DEFAULT_BATCH_SIZE};
pub use sink::{CommitKind, DocumentSink, MemorySink, NdjsonSink, SinkError, SinkEvent};
pub use extract::{run_extract, ExtractSummary};
