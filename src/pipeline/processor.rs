//! Batch orchestrator: pages in, one report per document out.
//!
//! normalize → group → (per document) translate → extract → classify →
//! score → summarise → emit.
//!
//! Grouping is one sequential pass over the batch. Documents then run
//! concurrently, bounded by `batch.document_workers`, and share nothing but
//! the injected engines and the cancellation registry.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use uuid::Uuid;

use super::cancel::CancellationRegistry;
use super::classify::{ClassificationResult, Classifier};
use super::entities::EntityExtractor;
use super::grouping::{GroupingEngine, GroupingOutcome, PageView};
use super::ingest::{compute_overall_confidence, ingest_pages, low_confidence_pages, thresholds, OcrEngine};
use super::normalize::{NormalizedText, OcrNormalizer};
use super::relevance::RelevanceScorer;
use super::report::summary::{executive_summary, extract_metadata, garble_indicators, DEGRADATION_THRESHOLD};
use super::report::{ReportSink, SinkError};
use super::translation::{detect_language, ChunkedTranslator, TranslationEngine, TranslationOutput};
use super::{DocumentError, PipelineError};
use crate::models::{
    AnalysisReport, DocumentGroup, Page, PageRange, ReportWarning, ScanImage, TranslationStatus, TranslationSummary,
};
use crate::pipeline_config::PipelineConfig;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A document excluded from the batch output.
#[derive(Debug)]
pub struct DocumentFailure {
    pub pages: PageRange,
    pub error: DocumentError,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub batch_id: Uuid,
    /// Emitted reports, ordered by first page.
    pub reports: Vec<AnalysisReport>,
    /// Sink locations, parallel to `reports`.
    pub artifacts: Vec<PathBuf>,
    pub failures: Vec<DocumentFailure>,
    pub grouping: GroupingOutcome,
}

/// Read-only view of one batch shared by its document workers.
struct BatchContext<'a> {
    id: Uuid,
    pages: &'a [Page],
    normalized: &'a [NormalizedText],
    grouping: &'a GroupingOutcome,
}

impl BatchContext<'_> {
    fn position(&self, page_index: usize) -> Option<usize> {
        self.pages.binary_search_by_key(&page_index, |p| p.index).ok()
    }
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

pub struct DocumentProcessor {
    config: PipelineConfig,
    normalizer: OcrNormalizer,
    grouping: GroupingEngine,
    translator: ChunkedTranslator,
    extractor: EntityExtractor,
    classifier: Classifier,
    scorer: RelevanceScorer,
    cancellation: Arc<CancellationRegistry>,
}

impl DocumentProcessor {
    pub fn new(config: PipelineConfig, engine: Arc<dyn TranslationEngine>) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            normalizer: OcrNormalizer::new(),
            grouping: GroupingEngine::new(config.grouping.clone()),
            translator: ChunkedTranslator::new(engine, config.translation.clone()),
            extractor: EntityExtractor::new(&config.extraction),
            classifier: Classifier::new(config.classification.clone()),
            scorer: RelevanceScorer::new(config.relevance.clone()),
            cancellation: Arc::new(CancellationRegistry::new()),
            config,
        })
    }

    /// Share a cancellation registry with the caller.
    pub fn with_cancellation(mut self, registry: Arc<CancellationRegistry>) -> Self {
        self.cancellation = registry;
        self
    }

    pub fn with_translation_timeout(mut self, timeout: Duration) -> Self {
        self.translator = self.translator.with_timeout(timeout);
        self
    }

    pub fn cancellation(&self) -> &Arc<CancellationRegistry> {
        &self.cancellation
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// OCR `images` with `ocr`, then process them as one batch.
    pub async fn process_scans(
        &self,
        images: &[ScanImage],
        ocr: &dyn OcrEngine,
        sink: Arc<dyn ReportSink>,
    ) -> Result<BatchOutcome, PipelineError> {
        let pages = ingest_pages(images, ocr);
        self.process_batch(&pages, sink).await
    }

    pub async fn process_batch(&self, pages: &[Page], sink: Arc<dyn ReportSink>) -> Result<BatchOutcome, PipelineError> {
        self.process_batch_as(Uuid::new_v4(), pages, sink).await
    }

    /// Process under a caller-chosen batch id. Report ids derive from the
    /// batch id and page range, so re-running a batch reproduces them.
    pub async fn process_batch_as(
        &self,
        batch_id: Uuid,
        pages: &[Page],
        sink: Arc<dyn ReportSink>,
    ) -> Result<BatchOutcome, PipelineError> {
        validate_batch(pages)?;
        tracing::info!(batch = %batch_id, pages = pages.len(), "Batch processing started");

        let normalized: Vec<NormalizedText> = pages.iter().map(|p| self.normalizer.normalize_page(p)).collect();

        let min_chars = self.config.batch.min_page_chars;
        let views: Vec<PageView<'_>> = pages
            .iter()
            .zip(&normalized)
            .map(|(page, text)| PageView {
                index: page.index,
                page_number: page.page_number,
                text: if text.text.trim().chars().count() < min_chars {
                    ""
                } else {
                    text.text.as_str()
                },
                source_ref: page.source_ref.as_str(),
            })
            .collect();
        let grouping = self.grouping.group(&views);

        let batch = &BatchContext {
            id: batch_id,
            pages,
            normalized: &normalized,
            grouping: &grouping,
        };
        let sink = &sink;
        let results: Vec<_> = stream::iter(&grouping.groups)
            .map(|group| async move {
                let range = PageRange::new(group.first_page(), group.last_page());
                (range, self.process_document(batch, group, sink).await)
            })
            .buffered(self.config.batch.document_workers.max(1))
            .collect()
            .await;

        let mut reports = Vec::new();
        let mut artifacts = Vec::new();
        let mut failures = Vec::new();
        for (pages, result) in results {
            match result {
                Ok((report, artifact)) => {
                    reports.push(report);
                    artifacts.push(artifact);
                }
                Err(error) => {
                    tracing::warn!(pages = %pages, error = %error, "Document excluded from batch");
                    failures.push(DocumentFailure { pages, error });
                }
            }
        }

        tracing::info!(
            batch = %batch_id,
            documents = grouping.groups.len(),
            reports = reports.len(),
            failures = failures.len(),
            "Batch processing complete"
        );

        Ok(BatchOutcome {
            batch_id,
            reports,
            artifacts,
            failures,
            grouping,
        })
    }

    fn ensure_live(&self, first_page: usize) -> Result<(), DocumentError> {
        if self.cancellation.is_cancelled(first_page) {
            return Err(DocumentError::Cancelled);
        }
        Ok(())
    }

    async fn process_document(
        &self,
        batch: &BatchContext<'_>,
        group: &DocumentGroup,
        sink: &Arc<dyn ReportSink>,
    ) -> Result<(AnalysisReport, PathBuf), DocumentError> {
        let range = PageRange::new(group.first_page(), group.last_page());
        self.ensure_live(range.first)?;

        let positions: Vec<usize> = group.pages.iter().filter_map(|i| batch.position(*i)).collect();
        let members: Vec<&Page> = positions.iter().map(|p| &batch.pages[*p]).collect();
        let parts: Vec<NormalizedText> = positions.iter().map(|p| batch.normalized[*p].clone()).collect();
        let document = NormalizedText::join(&parts);
        if document.is_blank() {
            return Err(DocumentError::EmptyDocument {
                first_page: range.first,
                last_page: range.last,
            });
        }
        let text = document.text.as_str();

        let target = self.config.translation.target_language;
        let source = self
            .config
            .translation
            .source_language
            .unwrap_or_else(|| detect_language(text));
        let translation = self.translator.translate(text, source, target).await;
        self.ensure_live(range.first)?;

        let mut source_refs: Vec<String> = members.iter().map(|p| p.source_ref.clone()).collect();
        source_refs.dedup();

        let translated = (translation.status != TranslationStatus::NotRequired).then_some(translation.text.as_str());
        let entities = self.extractor.extract_document(text, translated, &source_refs);
        let classification = match translated {
            Some(translated) => self
                .classifier
                .classify(&format!("{text}\n\n{translated}"), &source_refs, &entities),
            None => self.classifier.classify(text, &source_refs, &entities),
        };
        let relevance = self.scorer.assess(&classification, &entities);

        let metadata = extract_metadata(text, &entities);
        let garble = garble_indicators(text);
        let degraded = garble.len() >= DEGRADATION_THRESHOLD;
        let summary = executive_summary(
            classification.document_type,
            &metadata,
            &entities,
            relevance.verdict,
            degraded,
        );

        let decisions: Vec<_> = group
            .pages
            .iter()
            .filter_map(|i| batch.grouping.decision_for(*i).cloned())
            .collect();
        let ambiguous: Vec<usize> = decisions.iter().filter(|d| d.ambiguous).map(|d| d.page_index).collect();
        let warnings = collect_warnings(&document, &members, &translation, &classification, garble, ambiguous);

        let report = AnalysisReport {
            report_id: AnalysisReport::derive_id(batch.id, range),
            batch_id: batch.id,
            generated_at: Utc::now(),
            pages: range,
            source_refs,
            ocr_confidence: compute_overall_confidence(&members),
            language: source,
            metadata,
            classification,
            relevance,
            entities,
            executive_summary: summary,
            original_text: document.text.clone(),
            translation: TranslationSummary {
                status: translation.status,
                source_language: source,
                target_language: target,
                text: translated.map(str::to_string),
                chunk_count: translation.chunk_count,
                failed_chunks: translation.failed_chunks.clone(),
            },
            corrections: document.corrections.len(),
            grouping: decisions,
            warnings,
        };

        // A document cancelled while it ran emits nothing.
        self.ensure_live(range.first)?;
        let (report, artifact) = emit_blocking(Arc::clone(sink), report).await?;
        tracing::info!(
            document = %report.report_id,
            pages = %range,
            document_type = %report.document_type(),
            verdict = %report.verdict(),
            partial = report.is_partial_translation(),
            "Document report emitted"
        );
        Ok((report, artifact))
    }
}

/// Sinks do file I/O; run them on the blocking pool.
async fn emit_blocking(
    sink: Arc<dyn ReportSink>,
    report: AnalysisReport,
) -> Result<(AnalysisReport, PathBuf), DocumentError> {
    let (report, result) = tokio::task::spawn_blocking(move || {
        let result = sink.emit(&report);
        (report, result)
    })
    .await
    .map_err(|e| SinkError::WorkerPanicked(e.to_string()))?;
    Ok((report, result?))
}

/// Pages must be non-empty, strictly ascending by index, with confidences
/// in [0, 1].
fn validate_batch(pages: &[Page]) -> Result<(), PipelineError> {
    if pages.is_empty() {
        return Err(PipelineError::EmptyBatch);
    }
    for pair in pages.windows(2) {
        if pair[1].index <= pair[0].index {
            return Err(PipelineError::CorruptBatch {
                reason: format!("page index {} follows {}", pair[1].index, pair[0].index),
            });
        }
    }
    if let Some(page) = pages.iter().find(|p| !(0.0..=1.0).contains(&p.ocr_confidence)) {
        return Err(PipelineError::CorruptBatch {
            reason: format!("page {} has OCR confidence {}", page.index, page.ocr_confidence),
        });
    }
    Ok(())
}

fn collect_warnings(
    document: &NormalizedText,
    members: &[&Page],
    translation: &TranslationOutput,
    classification: &ClassificationResult,
    garble: Vec<String>,
    ambiguous_pages: Vec<usize>,
) -> Vec<ReportWarning> {
    let mut warnings = Vec::new();
    if !translation.failed_chunks.is_empty() {
        warnings.push(ReportWarning::PartialTranslation {
            chunks: translation.failed_chunks.clone(),
        });
    }
    if !translation.trimmed_chunks.is_empty() {
        warnings.push(ReportWarning::RepetitionTrimmed {
            chunks: translation.trimmed_chunks.clone(),
        });
    }
    if !translation.oversized_chunks.is_empty() {
        warnings.push(ReportWarning::OversizedSentence {
            chunks: translation.oversized_chunks.clone(),
        });
    }

    let low = low_confidence_pages(members, thresholds::LOW);
    if !low.is_empty() {
        warnings.push(ReportWarning::LowOcrConfidence { pages: low });
    }
    if !document.noise.is_empty() {
        warnings.push(ReportWarning::OcrNoise {
            markers: document.noise.len(),
        });
    }
    if garble.len() >= DEGRADATION_THRESHOLD {
        warnings.push(ReportWarning::OcrDegradation { indicators: garble });
    }
    if !ambiguous_pages.is_empty() {
        warnings.push(ReportWarning::AmbiguousGrouping { pages: ambiguous_pages });
    }
    if !classification.is_classified() {
        warnings.push(ReportWarning::Unclassified);
    }
    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
