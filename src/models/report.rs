use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DocumentType, Language, RelevanceVerdict, TranslationStatus};
use super::entity::Entity;
use crate::pipeline::classify::ClassificationResult;
use crate::pipeline::grouping::GroupingDecision;
use crate::pipeline::relevance::RelevanceAssessment;

/// Inclusive page-index range of a document within its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub first: usize,
    pub last: usize,
}

impl PageRange {
    pub fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    pub fn page_count(&self) -> usize {
        self.last.saturating_sub(self.first) + 1
    }
}

impl std::fmt::Display for PageRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationSummary {
    pub status: TranslationStatus,
    pub source_language: Language,
    pub target_language: Language,
    /// Absent when no translation was required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub chunk_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_chunks: Vec<usize>,
}

impl TranslationSummary {
    pub fn is_partial(&self) -> bool {
        self.status == TranslationStatus::Partial
    }
}

/// Primary date and place of execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// As written in the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// ISO 8601 form of `date` when it could be parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_iso: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Degraded-quality flags carried on the report instead of failing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// Chunks kept in the source language after every retry failed.
    PartialTranslation { chunks: Vec<usize> },
    /// Chunks whose translation looped and was truncated.
    RepetitionTrimmed { chunks: Vec<usize> },
    /// Single sentences longer than the chunk budget, sent whole.
    OversizedSentence { chunks: Vec<usize> },
    LowOcrConfidence { pages: Vec<usize> },
    /// Mixed letter/digit tokens left uncorrected.
    OcrNoise { markers: usize },
    /// Known garble fragments still present after normalization.
    OcrDegradation { indicators: Vec<String> },
    /// Pages joined on a score within the ambiguity margin.
    AmbiguousGrouping { pages: Vec<usize> },
    Unclassified,
}

/// One record per document group. Built once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_id: Uuid,
    pub batch_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub pages: PageRange,
    pub source_refs: Vec<String>,
    pub ocr_confidence: f32,
    pub language: Language,
    pub metadata: DocumentMetadata,
    pub classification: ClassificationResult,
    pub relevance: RelevanceAssessment,
    pub entities: Vec<Entity>,
    pub executive_summary: String,
    pub original_text: String,
    pub translation: TranslationSummary,
    pub corrections: usize,
    pub grouping: Vec<GroupingDecision>,
    pub warnings: Vec<ReportWarning>,
}

impl AnalysisReport {
    /// Stable per input: the same batch id and page range give the same id.
    pub fn derive_id(batch_id: Uuid, pages: PageRange) -> Uuid {
        Uuid::new_v5(&batch_id, format!("pages:{}-{}", pages.first, pages.last).as_bytes())
    }

    pub fn document_type(&self) -> DocumentType {
        self.classification.document_type
    }

    pub fn verdict(&self) -> RelevanceVerdict {
        self.relevance.verdict
    }

    pub fn is_partial_translation(&self) -> bool {
        self.translation.is_partial()
    }
}
