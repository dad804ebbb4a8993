//! Document type classification from weighted keyword signatures and
//! entity cues.

pub mod signatures;

use serde::{Deserialize, Serialize};

use crate::models::{ConfidenceLevel, DocumentType, Entity};
use crate::pipeline::ingest::source_name::file_words;
use signatures::{ENTITY_CUES, SIGNATURES};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Weighted hits a type needs before it can win.
    pub min_match: f32,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self { min_match: 1.0 }
    }
}

/// One cue that counted toward the winning type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub cue: String,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub document_type: DocumentType,
    pub score: f32,
    pub confidence: ConfidenceLevel,
    pub evidence: Vec<Evidence>,
}

impl ClassificationResult {
    fn unclassified() -> Self {
        Self {
            document_type: DocumentType::Unclassified,
            score: 0.0,
            confidence: ConfidenceLevel::Low,
            evidence: Vec::new(),
        }
    }

    pub fn is_classified(&self) -> bool {
        self.document_type != DocumentType::Unclassified
    }
}

pub struct Classifier {
    config: ClassificationConfig,
}

impl Classifier {
    pub fn new(config: ClassificationConfig) -> Self {
        Self { config }
    }

    /// Score every type and keep the best. Types are visited in priority
    /// order and only a strictly higher score displaces the leader, so
    /// ties go to the earlier type.
    ///
    /// File names in `source_refs` count as extra text: a keyword found
    /// there and not in the body still scores, once.
    pub fn classify(&self, text: &str, source_refs: &[String], entities: &[Entity]) -> ClassificationResult {
        let names: Vec<String> = source_refs.iter().map(|r| file_words(r)).collect();
        let mut best: Option<(DocumentType, f32, Vec<Evidence>)> = None;

        for (doc_type, signatures) in SIGNATURES.iter() {
            let mut evidence: Vec<Evidence> = signatures
                .iter()
                .filter_map(|s| {
                    let cue = if s.regex.is_match(text) {
                        format!("keyword \"{}\"", s.keyword)
                    } else if names.iter().any(|n| s.regex.is_match(n)) {
                        format!("file name \"{}\"", s.keyword)
                    } else {
                        return None;
                    };
                    Some(Evidence { cue, weight: s.weight })
                })
                .collect();
            evidence.extend(entity_cues(*doc_type, entities));

            let score: f32 = evidence.iter().map(|e| e.weight).sum();
            if score > best.as_ref().map_or(0.0, |(_, s, _)| *s) {
                best = Some((*doc_type, score, evidence));
            }
        }

        let Some((document_type, score, evidence)) = best.filter(|(_, s, _)| *s >= self.config.min_match) else {
            tracing::debug!(min_match = self.config.min_match, "No signature cleared the threshold");
            return ClassificationResult::unclassified();
        };

        tracing::debug!(document_type = %document_type, score, cues = evidence.len(), "Document classified");
        ClassificationResult {
            document_type,
            score,
            confidence: confidence_for(score),
            evidence,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassificationConfig::default())
    }
}

/// One cue per (kind, label) present, however many entities carry it.
fn entity_cues(doc_type: DocumentType, entities: &[Entity]) -> Vec<Evidence> {
    ENTITY_CUES
        .iter()
        .filter(|(_, _, cue_type, _)| *cue_type == doc_type)
        .filter(|(kind, label, _, _)| entities.iter().any(|e| e.kind == *kind && e.has_label(label)))
        .map(|(kind, label, _, weight)| Evidence {
            cue: format!("{kind} \"{label}\""),
            weight: *weight,
        })
        .collect()
}

pub fn confidence_for(score: f32) -> ConfidenceLevel {
    if score >= 3.0 {
        ConfidenceLevel::High
    } else if score >= 2.0 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}
