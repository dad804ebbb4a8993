//! Cooperative cancellation for batch processing.
//!
//! The processor checks the registry between stages. A cancelled document
//! emits no report; documents already emitted are unaffected.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Cancellation flags for one processor.
///
/// Documents are addressed by the index of their first page, which is
/// stable once grouping has run.
#[derive(Debug, Default)]
pub struct CancellationRegistry {
    all: AtomicBool,
    documents: Mutex<HashSet<usize>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every document not yet emitted.
    pub fn cancel_all(&self) {
        self.all.store(true, Ordering::Relaxed);
        tracing::info!("Batch cancellation requested");
    }

    /// Cancel the document whose first page is `first_page`.
    pub fn cancel_document(&self, first_page: usize) {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(first_page);
        }
        tracing::info!(first_page, "Document cancellation requested");
    }

    pub fn is_batch_cancelled(&self) -> bool {
        self.all.load(Ordering::Relaxed)
    }

    pub fn is_cancelled(&self, first_page: usize) -> bool {
        self.is_batch_cancelled()
            || self
                .documents
                .lock()
                .map(|documents| documents.contains(&first_page))
                .unwrap_or(false)
    }

    /// Clear every flag so the processor can run another batch.
    pub fn reset(&self) {
        self.all.store(false, Ordering::Relaxed);
        if let Ok(mut documents) = self.documents.lock() {
            documents.clear();
        }
    }
}
