use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use super::chunker::{plan_chunks, TranslationChunk};
use super::repetition::trim_repetition;
use super::{TranslationConfig, TranslationEngine, TranslationError};
use crate::models::{Language, TranslationStatus};

/// Adapter calls per chunk: the original attempt plus one retry.
const MAX_ATTEMPTS: usize = 2;

/// A translated document, reassembled in chunk order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationOutput {
    pub text: String,
    pub status: TranslationStatus,
    pub chunk_count: usize,
    /// Chunks kept in the source language after every attempt failed.
    pub failed_chunks: Vec<usize>,
    /// Chunks whose output looped and was truncated.
    pub trimmed_chunks: Vec<usize>,
    /// Single sentences longer than the chunk budget.
    pub oversized_chunks: Vec<usize>,
}

impl TranslationOutput {
    fn not_required(text: &str) -> Self {
        Self {
            text: text.to_string(),
            status: TranslationStatus::NotRequired,
            chunk_count: 0,
            failed_chunks: Vec::new(),
            trimmed_chunks: Vec::new(),
            oversized_chunks: Vec::new(),
        }
    }
}

/// Translates long documents chunk by chunk under a context budget.
///
/// Chunks of one document run concurrently, bounded by `workers`; output is
/// always reassembled by chunk sequence. A chunk whose adapter calls all
/// fail keeps its original text and marks the document partial.
pub struct ChunkedTranslator {
    engine: Arc<dyn TranslationEngine>,
    config: TranslationConfig,
    timeout: Duration,
}

impl ChunkedTranslator {
    pub fn new(engine: Arc<dyn TranslationEngine>, config: TranslationConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs);
        Self {
            engine,
            config,
            timeout,
        }
    }

    /// Override the per-call timeout with sub-second precision.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    pub async fn translate(&self, text: &str, source: Language, target: Language) -> TranslationOutput {
        if source == target {
            return TranslationOutput::not_required(text);
        }

        let plan = plan_chunks(text, self.config.max_chunk_size);
        tracing::info!(
            chunks = plan.len(),
            chars = text.chars().count(),
            source = %source,
            target = %target,
            "Translating document"
        );

        let permits = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let calls = plan.chunks.iter().map(|chunk| {
            let permits = Arc::clone(&permits);
            async move {
                let _permit = permits.acquire().await.ok();
                self.translate_chunk(chunk, source, target).await
            }
        });
        // join_all yields results in input order, whatever order calls finish in.
        let results = join_all(calls).await;

        let mut rendered = Vec::with_capacity(results.len());
        let mut failed_chunks = Vec::new();
        let mut trimmed_chunks = Vec::new();

        for (chunk, result) in plan.chunks.iter().zip(results) {
            match result {
                Ok(translated) => {
                    let tidy = tidy_translation(&translated);
                    match trim_repetition(&tidy) {
                        Some(trimmed) => {
                            tracing::warn!(chunk = chunk.sequence, "Repetitive translation output truncated");
                            trimmed_chunks.push(chunk.sequence);
                            rendered.push(trimmed);
                        }
                        None => rendered.push(tidy),
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        chunk = chunk.sequence,
                        attempts = MAX_ATTEMPTS,
                        error = %e,
                        "Chunk left untranslated"
                    );
                    failed_chunks.push(chunk.sequence);
                    rendered.push(chunk.text.clone());
                }
            }
        }

        let status = if failed_chunks.is_empty() {
            TranslationStatus::Complete
        } else {
            TranslationStatus::Partial
        };

        TranslationOutput {
            text: plan.reassemble_with(|chunk| rendered[chunk.sequence].as_str()),
            status,
            chunk_count: plan.len(),
            failed_chunks,
            trimmed_chunks,
            oversized_chunks: plan
                .chunks
                .iter()
                .filter(|c| c.oversized)
                .map(|c| c.sequence)
                .collect(),
        }
    }

    async fn translate_chunk(
        &self,
        chunk: &TranslationChunk,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        let mut attempt = 1;
        loop {
            match self.call_engine(chunk.text.clone(), source, target).await {
                Ok(translated) => return Ok(translated),
                Err(e) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        chunk = chunk.sequence,
                        attempt,
                        error = %e,
                        "Chunk translation failed, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One adapter call on the blocking pool. A timed-out call is abandoned,
    /// not interrupted: the engine thread finishes in the background.
    async fn call_engine(
        &self,
        text: String,
        source: Language,
        target: Language,
    ) -> Result<String, TranslationError> {
        let engine = Arc::clone(&self.engine);
        let handle = tokio::task::spawn_blocking(move || engine.translate(&text, source, target));

        match tokio::time::timeout(self.timeout, handle).await {
            Err(_) => Err(TranslationError::Timeout(self.timeout)),
            Ok(Err(join_error)) => Err(TranslationError::WorkerPanicked(join_error.to_string())),
            Ok(Ok(result)) => result,
        }
    }
}

/// Trim the adapter output and fold blank-line runs inside it, so a chunk
/// never introduces paragraph breaks of its own.
fn tidy_translation(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
