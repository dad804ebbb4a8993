//! Fake adapters shared by pipeline tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{
    AnalysisReport, ConfidenceLevel, DocumentMetadata, DocumentType, Entity, EntityCompleteness, EntityKind,
    Language, LegalTier, PageRange, RelevanceVerdict, ScanImage, TextSource, TranslationStatus,
    TranslationSummary,
};
use crate::pipeline::classify::{ClassificationResult, Evidence};
use crate::pipeline::grouping::GroupingDecision;
use crate::pipeline::ingest::{OcrEngine, OcrPageResult};
use crate::pipeline::relevance::RelevanceAssessment;
use crate::pipeline::report::{ReportSink, SinkError};
use crate::pipeline::translation::{TranslationEngine, TranslationError};

/// Returns canned text per image index; unknown indices read as blank.
pub struct FixedOcrEngine {
    pages: Vec<(String, f32)>,
}

impl FixedOcrEngine {
    pub fn new(pages: Vec<(&str, f32)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(text, confidence)| (text.to_string(), confidence))
                .collect(),
        }
    }
}

impl OcrEngine for FixedOcrEngine {
    fn recognize(&self, image: &ScanImage) -> OcrPageResult {
        match self.pages.get(image.index) {
            Some((text, confidence)) => OcrPageResult {
                text: text.clone(),
                confidence: *confidence,
            },
            None => OcrPageResult::empty(),
        }
    }
}

/// Uppercases its input.
pub struct UppercaseTranslationEngine;

impl TranslationEngine for UppercaseTranslationEngine {
    fn translate(&self, text: &str, _source: Language, _target: Language) -> Result<String, TranslationError> {
        Ok(text.to_uppercase())
    }
}

/// Prefixes input with the target language code. Specific inputs can be
/// scripted to fail a number of times or to return a fixed response.
/// Records every call.
#[derive(Default)]
pub struct ScriptedTranslationEngine {
    failures: Mutex<HashMap<String, usize>>,
    responses: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTranslationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` calls whose input is exactly `text`.
    pub fn fail_times(self, text: &str, times: usize) -> Self {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(text.to_string(), times);
        }
        self
    }

    pub fn respond(mut self, text: &str, response: &str) -> Self {
        self.responses.insert(text.to_string(), response.to_string());
        self
    }

    pub fn calls_for(&self, text: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| calls.iter().filter(|c| c.as_str() == text).count())
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }
}

impl TranslationEngine for ScriptedTranslationEngine {
    fn translate(&self, text: &str, _source: Language, target: Language) -> Result<String, TranslationError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(text.to_string());
        }
        if let Ok(mut failures) = self.failures.lock() {
            if let Some(remaining) = failures.get_mut(text) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(TranslationError::Engine(format!("scripted failure for {text:?}")));
                }
            }
        }
        match self.responses.get(text) {
            Some(response) => Ok(response.clone()),
            None => Ok(format!("[{}] {text}", target.as_str())),
        }
    }
}

/// Sleeps before answering, for timeout paths.
pub struct SlowTranslationEngine {
    delay: Duration,
}

impl SlowTranslationEngine {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl TranslationEngine for SlowTranslationEngine {
    fn translate(&self, text: &str, _source: Language, _target: Language) -> Result<String, TranslationError> {
        std::thread::sleep(self.delay);
        Ok(text.to_string())
    }
}

/// Uppercases its input after a delay chosen by the input's opening word,
/// so chunks can be made to finish in any order. Records completions.
pub struct StaggeredTranslationEngine {
    delays: Vec<(String, Duration)>,
    completed: Mutex<Vec<String>>,
}

impl StaggeredTranslationEngine {
    pub fn new(delays: &[(&str, u64)]) -> Self {
        Self {
            delays: delays
                .iter()
                .map(|(prefix, millis)| (prefix.to_string(), Duration::from_millis(*millis)))
                .collect(),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl TranslationEngine for StaggeredTranslationEngine {
    fn translate(&self, text: &str, _source: Language, _target: Language) -> Result<String, TranslationError> {
        let delay = self
            .delays
            .iter()
            .find(|(prefix, _)| text.trim_start().starts_with(prefix.as_str()))
            .map_or(Duration::ZERO, |(_, delay)| *delay);
        std::thread::sleep(delay);
        if let Ok(mut completed) = self.completed.lock() {
            completed.push(text.to_string());
        }
        Ok(text.to_uppercase())
    }
}

/// Collects emitted reports in memory.
#[derive(Default)]
pub struct MemorySink {
    reports: Mutex<Vec<AnalysisReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<AnalysisReport> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ReportSink for MemorySink {
    fn emit(&self, report: &AnalysisReport) -> Result<PathBuf, SinkError> {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(report.clone());
        }
        Ok(PathBuf::from(format!("memory://{}", report.report_id)))
    }
}

/// A fully populated report for a two-page will.
pub fn sample_report() -> AnalysisReport {
    let batch_id = Uuid::new_v4();
    let pages = PageRange::new(3, 4);
    let original = "En la ciudad de Holguín, a 25 de febrero de 1960, ante mí, Notario, \
                    comparece Don Pedro Ruiz y otorga su testamento sobre la finca La Esperanza.";

    let entities = vec![
        Entity::new(EntityKind::Party, "Pedro Ruiz", 62, TextSource::Original).with_label("titled"),
        Entity::new(EntityKind::Date, "25 de febrero de 1960", 27, TextSource::Original)
            .with_label("numeric")
            .with_normalized("1960-02-25"),
        Entity::new(EntityKind::Property, "finca La Esperanza", 104, TextSource::Original)
            .with_label("finca")
            .with_normalized("La Esperanza"),
        Entity::new(EntityKind::LegalReference, "Escritura número 112", 0, TextSource::Original)
            .with_label("deed")
            .with_normalized("112"),
    ];

    AnalysisReport {
        report_id: AnalysisReport::derive_id(batch_id, pages),
        batch_id,
        generated_at: Utc::now(),
        pages,
        source_refs: vec!["scan-003.png".into(), "scan-004.png".into()],
        ocr_confidence: 0.875,
        language: Language::Spanish,
        metadata: DocumentMetadata {
            date: Some("25 de febrero de 1960".into()),
            date_iso: Some("1960-02-25".into()),
            location: Some("Holguín".into()),
        },
        classification: ClassificationResult {
            document_type: DocumentType::LastWillAndTestament,
            score: 4.0,
            confidence: ConfidenceLevel::High,
            evidence: vec![Evidence {
                cue: "testamento".into(),
                weight: 1.0,
            }],
        },
        relevance: RelevanceAssessment {
            verdict: RelevanceVerdict::Critical,
            table_verdict: RelevanceVerdict::Critical,
            tier: LegalTier::Dispositive,
            completeness: EntityCompleteness::Complete,
            reasons: vec!["Dispositive document with parties and property identified".into()],
        },
        entities,
        executive_summary: "This is a **Last Will and Testament**.".into(),
        original_text: original.into(),
        translation: TranslationSummary {
            status: TranslationStatus::Complete,
            source_language: Language::Spanish,
            target_language: Language::English,
            text: Some("In the city of Holguín, on February 25, 1960.".into()),
            chunk_count: 1,
            failed_chunks: Vec::new(),
        },
        corrections: 2,
        grouping: vec![GroupingDecision {
            page_index: 4,
            score: 0.9,
            joined: true,
            signals: Vec::new(),
            ambiguous: false,
        }],
        warnings: Vec::new(),
    }
}
