//! Report metadata and the templated executive summary.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{DocumentMetadata, DocumentType, Entity, EntityKind, RelevanceVerdict, TextSource};

/// Fragments that survive only in badly garbled OCR.
const GARBLE_INDICATORS: &[&str] = &["ccn", "ccnt", "cst", "dcb", "lcs", "ncn", "ostá", "quc"];

/// Distinct garble fragments at which a document counts as degraded.
pub const DEGRADATION_THRESHOLD: usize = 3;

const SUMMARY_PROPERTIES: usize = 3;

const PLACE: &str = r"[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+(?:\s+(?:del\s+)?[A-ZÁÉÍÓÚÑ][a-záéíóúñ]+)?";

static GARBLE_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    GARBLE_INDICATORS
        .iter()
        .map(|indicator| {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(indicator))).expect("valid regex");
            (*indicator, re)
        })
        .collect()
});

static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"\b[Ee]n\s+la\s+ciudad\s+de\s+(?:la\s+)?({PLACE})"),
        format!(r"\b[Ee]n\s+({PLACE}),?\s*(?i:provincia|partido|oriente|occidente)\b"),
        format!(r"\b({PLACE}),\s*(?:Oriente|Occidente|Habana|Camag[üu]ey|Las\s+Villas|Matanzas|Pinar\s+del\s+R[íi]o)\b"),
        format!(r"\b[Nn]otario\s+(?:que\s+fue\s+)?de\s+(?:este\s+)?(?:[Dd]istrito\s+de\s+)?({PLACE})"),
        format!(r"(?i:\b(?:in|at)\s+the\s+city\s+of)\s+({PLACE})"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Words the location patterns can pick up that are not places.
const GENERIC_WORDS: &[&str] = &["El", "Esta", "Este", "La", "Las", "Los", "The"];

/// Primary date (first full date in the original, else the first bare year)
/// and place of execution.
pub fn extract_metadata(text: &str, entities: &[Entity]) -> DocumentMetadata {
    let dates: Vec<&Entity> = entities
        .iter()
        .filter(|e| e.kind == EntityKind::Date && e.source == TextSource::Original)
        .collect();
    let primary = dates
        .iter()
        .find(|e| !e.has_label("year"))
        .or_else(|| dates.first())
        .copied();

    DocumentMetadata {
        date: primary.map(|e| e.text.clone()),
        date_iso: primary.and_then(|e| e.normalized.clone()),
        location: extract_location(text),
    }
}

pub fn extract_location(text: &str) -> Option<String> {
    LOCATION_PATTERNS.iter().find_map(|re| {
        re.captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .find(|place| !GENERIC_WORDS.contains(place))
            .map(str::to_string)
    })
}

/// Garble fragments standing as whole words in `text`, in table order.
pub fn garble_indicators(text: &str) -> Vec<String> {
    GARBLE_PATTERNS
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(indicator, _)| indicator.to_string())
        .collect()
}

/// Entity texts of one kind, first occurrence order, each once.
pub fn distinct_texts(entities: &[Entity], kind: EntityKind) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for entity in entities.iter().filter(|e| e.kind == kind) {
        if !seen.contains(&entity.text.as_str()) {
            seen.push(&entity.text);
        }
    }
    seen
}

pub fn relevance_statement(verdict: RelevanceVerdict) -> &'static str {
    match verdict {
        RelevanceVerdict::Critical => "This document appears to be **directly relevant** to establishing property ownership or inheritance rights and should be prioritized for legal review.",
        RelevanceVerdict::High => "This document contains information that **may support** property claims or help establish the chain of ownership.",
        RelevanceVerdict::Medium => "This document provides **supporting context** but may not directly establish ownership rights.",
        RelevanceVerdict::Low => "This document has **limited direct relevance** to property claims but may provide historical or procedural context.",
    }
}

/// One templated sentence, the relevance statement, and an OCR note when
/// the source is degraded.
pub fn executive_summary(
    doc_type: DocumentType,
    metadata: &DocumentMetadata,
    entities: &[Entity],
    verdict: RelevanceVerdict,
    degraded: bool,
) -> String {
    let mut parts = vec![format!("This is a **{}**", doc_type.label())];

    let mut when_where = Vec::new();
    if let Some(date) = &metadata.date {
        when_where.push(format!("dated **{date}**"));
    }
    if let Some(location) = &metadata.location {
        when_where.push(format!("from **{location}**"));
    }
    if !when_where.is_empty() {
        parts.push(when_where.join(", "));
    }

    let parties = distinct_texts(entities, EntityKind::Party);
    match parties.as_slice() {
        [] => {}
        [one] => parts.push(format!("involving **{one}**")),
        [a, b] => parts.push(format!("involving **{a}** and **{b}**")),
        [a, b, rest @ ..] => parts.push(format!(
            "involving **{a}**, **{b}**, and {} other {}",
            rest.len(),
            if rest.len() == 1 { "party" } else { "parties" }
        )),
    }

    let properties = distinct_texts(entities, EntityKind::Property);
    if !properties.is_empty() {
        let listed: Vec<String> = properties
            .iter()
            .take(SUMMARY_PROPERTIES)
            .map(|p| format!("**{p}**"))
            .collect();
        parts.push(format!("concerning {}", listed.join(", ")));
    }

    let mut summary = format!("{}.\n\n{}", parts.join(" "), relevance_statement(verdict));
    if degraded {
        summary.push_str(
            "\n\n*Note: Source document shows significant OCR degradation. Manual review of original recommended.*",
        );
    }
    summary
}
