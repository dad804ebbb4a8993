use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::summary::distinct_texts;
use super::{write_artifact, ReportSink, SinkError};
use crate::models::{AnalysisReport, EntityKind, ReportWarning, TranslationStatus};

/// Characters of original text shown before truncating.
const ORIGINAL_TEXT_LIMIT: usize = 3000;

/// Writes `<dir>/<report_id>.md` in the legal analysis layout.
pub struct MarkdownDirectorySink {
    dir: PathBuf,
}

impl MarkdownDirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for MarkdownDirectorySink {
    fn emit(&self, report: &AnalysisReport) -> Result<PathBuf, SinkError> {
        write_artifact(&self.dir, &format!("{}.md", report.report_id), &render_markdown(report))
    }
}

fn or_unknown(value: Option<&str>, unknown: &'static str) -> String {
    value.map_or_else(|| unknown.to_string(), str::to_string)
}

fn bullet_list(items: &[&str], empty: &str) -> String {
    if items.is_empty() {
        return format!("- {empty}\n");
    }
    items.iter().map(|item| format!("- {item}\n")).collect()
}

fn translation_label(report: &AnalysisReport) -> String {
    let t = &report.translation;
    match t.status {
        TranslationStatus::NotRequired => "Not required".to_string(),
        TranslationStatus::Complete => format!("Complete ({} -> {}, {} chunks)", t.source_language, t.target_language, t.chunk_count),
        TranslationStatus::Partial => format!(
            "**Partial translation** ({} of {} chunks left untranslated)",
            t.failed_chunks.len(),
            t.chunk_count
        ),
    }
}

fn warning_line(warning: &ReportWarning) -> String {
    let list = |items: &[usize]| items.iter().map(usize::to_string).collect::<Vec<_>>().join(", ");
    match warning {
        ReportWarning::PartialTranslation { chunks } => {
            format!("Chunks {} kept in the original language after failed retries", list(chunks))
        }
        ReportWarning::RepetitionTrimmed { chunks } => {
            format!("Repetitive translation output truncated in chunks {}", list(chunks))
        }
        ReportWarning::OversizedSentence { chunks } => {
            format!("Sentences longer than the chunk budget in chunks {}", list(chunks))
        }
        ReportWarning::LowOcrConfidence { pages } => format!("Low OCR confidence on pages {}", list(pages)),
        ReportWarning::OcrNoise { markers } => format!("{markers} uncorrected OCR noise tokens"),
        ReportWarning::OcrDegradation { indicators } => {
            format!("OCR degradation indicators present: {}", indicators.join(", "))
        }
        ReportWarning::AmbiguousGrouping { pages } => {
            format!("Pages {} joined on an ambiguous continuity score", list(pages))
        }
        ReportWarning::Unclassified => "No document type signature cleared the threshold".to_string(),
    }
}

/// Render the full report. Sections appear in a fixed order and are always
/// present, with a placeholder line when empty.
pub fn render_markdown(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let doc_type = report.document_type();

    out.push_str("# LEGAL DOCUMENT ANALYSIS REPORT\n\n---\n\n## Document Identification\n\n");
    out.push_str("| Field | Value |\n|-------|-------|\n");
    let rows = [
        ("Report ID", report.report_id.to_string()),
        ("Document Type", doc_type.label().to_string()),
        ("Classification Confidence", report.classification.confidence.as_str().to_string()),
        ("Legal Relevance", format!("**{}**", report.verdict())),
        ("Date", or_unknown(report.metadata.date.as_deref(), "Unknown Date")),
        ("Location", or_unknown(report.metadata.location.as_deref(), "Unknown Location")),
        ("Pages", format!("{} ({})", report.pages.page_count(), report.pages)),
        ("OCR Confidence", format!("{:.0}%", report.ocr_confidence * 100.0)),
        ("Translation", translation_label(report)),
    ];
    for (field, value) in rows {
        let _ = writeln!(out, "| **{field}** | {value} |");
    }

    out.push_str("\n**Source Files**:\n");
    for source in &report.source_refs {
        let _ = writeln!(out, "  - `{source}`");
    }

    let _ = write!(out, "\n---\n\n## Executive Summary\n\n{}\n\n---\n\n", report.executive_summary);

    out.push_str("## Legal Analysis\n\n");
    let _ = writeln!(out, "### Relevance Assessment: {}\n", report.verdict());
    let reasons: Vec<&str> = report.relevance.reasons.iter().map(String::as_str).collect();
    out.push_str(&bullet_list(&reasons, "No reasons recorded"));

    out.push_str("\n### Parties Identified\n\n");
    out.push_str(&bullet_list(
        &distinct_texts(&report.entities, EntityKind::Party),
        "No parties identified (manual review recommended)",
    ));

    out.push_str("\n### Properties Referenced\n\n");
    out.push_str(&bullet_list(
        &distinct_texts(&report.entities, EntityKind::Property),
        "No specific properties identified",
    ));

    out.push_str("\n### Legal References\n\n");
    let references: Vec<String> = report
        .entities
        .iter()
        .filter(|e| e.kind == EntityKind::LegalReference)
        .map(|e| match &e.label {
            Some(label) => format!("**{label}**: {}", e.text),
            None => e.text.clone(),
        })
        .collect();
    let references: Vec<&str> = references.iter().map(String::as_str).collect();
    out.push_str(&bullet_list(&references, "No formal legal references extracted"));

    if !report.warnings.is_empty() {
        out.push_str("\n### Processing Warnings\n\n");
        for warning in &report.warnings {
            let _ = writeln!(out, "- {}", warning_line(warning));
        }
    }

    out.push_str("\n---\n\n## Document Content\n\n### Original Text (OCR Extracted)\n\n```\n");
    let total = report.original_text.chars().count();
    if total > ORIGINAL_TEXT_LIMIT {
        out.extend(report.original_text.chars().take(ORIGINAL_TEXT_LIMIT));
        let _ = write!(out, "\n\n... [truncated, {} more chars]", total - ORIGINAL_TEXT_LIMIT);
    } else {
        out.push_str(&report.original_text);
    }
    out.push_str("\n```\n");

    if let Some(text) = &report.translation.text {
        let _ = write!(out, "\n### Translation ({})\n\n{}\n", report.translation.target_language, text);
    }

    out
}
