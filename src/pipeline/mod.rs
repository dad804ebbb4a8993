pub mod cancel;
pub mod classify;
pub mod entities;
pub mod grouping;
pub mod ingest;
pub mod normalize;
pub mod processor;
pub mod relevance;
pub mod report;
pub mod translation;

#[cfg(test)]
pub mod testing;

pub use cancel::CancellationRegistry;
pub use processor::{BatchOutcome, DocumentFailure, DocumentProcessor};

use thiserror::Error;

use crate::pipeline_config::ConfigError;
use report::SinkError;

/// Failure confined to one document; the rest of the batch continues.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Pages {first_page}-{last_page} contain no usable text")]
    EmptyDocument { first_page: usize, last_page: usize },

    #[error("Document processing cancelled")]
    Cancelled,

    #[error("Report emission failed: {0}")]
    Sink(#[from] SinkError),
}

/// Structural input errors that stop the whole batch.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Batch contains no pages")]
    EmptyBatch,

    #[error("Corrupt batch: {reason}")]
    CorruptBatch { reason: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
