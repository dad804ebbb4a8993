pub mod lexicon;
pub mod sanitize;
pub mod substitution;

pub use sanitize::sanitize_ocr_text;

use serde::{Deserialize, Serialize};

/// One substitution applied to the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    /// Byte offset of the corrected token in the normalized text.
    pub offset: usize,
    pub original: String,
    pub corrected: String,
    pub rule: String,
}

/// A mixed letter/digit token that no rule could settle (RecoverableOCRNoise).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoiseMarker {
    pub offset: usize,
    pub token: String,
}

/// Text after substitution-error correction, with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub text: String,
    /// Page indices the text was derived from, ascending.
    pub source_pages: Vec<usize>,
    /// Passed through from OCR; never used for correction decisions.
    pub ocr_confidence: f32,
    pub corrections: Vec<Correction>,
    pub noise: Vec<NoiseMarker>,
}

impl NormalizedText {
    /// Concatenate per-page texts into one document text.
    ///
    /// Non-empty parts are separated by a blank line; offsets of corrections
    /// and noise markers are shifted into the joined text. Confidence is the
    /// length-weighted mean of the parts.
    pub fn join(parts: &[NormalizedText]) -> NormalizedText {
        let mut joined = NormalizedText {
            text: String::new(),
            source_pages: Vec::new(),
            ocr_confidence: 0.0,
            corrections: Vec::new(),
            noise: Vec::new(),
        };
        let mut weighted = 0.0f64;
        let mut total_chars = 0usize;

        for part in parts {
            joined.source_pages.extend_from_slice(&part.source_pages);
            if part.text.is_empty() {
                continue;
            }
            if !joined.text.is_empty() {
                joined.text.push_str("\n\n");
            }
            let shift = joined.text.len();
            joined.text.push_str(&part.text);
            joined.corrections.extend(part.corrections.iter().map(|c| Correction {
                offset: c.offset + shift,
                ..c.clone()
            }));
            joined.noise.extend(part.noise.iter().map(|n| NoiseMarker {
                offset: n.offset + shift,
                ..n.clone()
            }));

            let chars = part.text.chars().count();
            weighted += part.ocr_confidence as f64 * chars as f64;
            total_chars += chars;
        }

        joined.source_pages.sort_unstable();
        joined.source_pages.dedup();
        if total_chars > 0 {
            joined.ocr_confidence = (weighted / total_chars as f64) as f32;
        }
        joined
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Corrects systematic OCR noise before any semantic processing.
///
/// Stages run once each, in order: sanitation, digit/letter substitution,
/// known-misread lexicon. No stage is iterated to a fixed point, and running
/// the normalizer over its own output changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OcrNormalizer;

impl OcrNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, raw: &str, ocr_confidence: f32) -> NormalizedText {
        let sanitized = sanitize_ocr_text(raw);
        let substituted = substitution::apply_substitutions(&sanitized);
        let (text, lexicon_fixes) = lexicon::correct_known_misreads(&substituted.text);

        let mut corrections = substituted.corrections;
        corrections.extend(lexicon_fixes);
        corrections.sort_by_key(|c| c.offset);

        if !substituted.noise.is_empty() {
            tracing::debug!(
                markers = substituted.noise.len(),
                tokens = ?substituted.noise.iter().map(|n| n.token.as_str()).collect::<Vec<_>>(),
                "Ambiguous OCR tokens left uncorrected"
            );
        }

        NormalizedText {
            text,
            source_pages: Vec::new(),
            ocr_confidence,
            corrections,
            noise: substituted.noise,
        }
    }

    /// Normalize one page, recording it as the text's provenance.
    pub fn normalize_page(&self, page: &crate::models::Page) -> NormalizedText {
        let mut normalized = self.normalize(&page.raw_text, page.ocr_confidence);
        normalized.source_pages = vec![page.index];
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;

    #[test]
    fn land_scenario() {
        let normalized = OcrNormalizer::new().normalize("the 1and of the estate", 0.7);
        assert_eq!(normalized.text, "the land of the estate");
        assert_eq!(normalized.ocr_confidence, 0.7);
        assert_eq!(normalized.corrections.len(), 1);
    }

    #[test]
    fn stages_run_in_order() {
        let raw = "  ESCRITURA\r\n\r\n\r\ncomparece e1 notaric de1 distrito  \r\n";
        let normalized = OcrNormalizer::new().normalize(raw, 0.5);
        assert_eq!(normalized.text, "ESCRITURA\n\ncomparece el notario del distrito");
        let rules: Vec<&str> = normalized.corrections.iter().map(|c| c.rule.as_str()).collect();
        assert_eq!(rules, vec!["short_word", "lexicon", "digit_in_word"]);
    }

    #[test]
    fn normalizer_is_idempotent() {
        let normalizer = OcrNormalizer::new();
        let inputs = [
            "1and de1 señor e1 notario 19o5",
            "TESTAMENTO\n\n\nquc ostá p0r 0 sean\ncasa V tierra",
            "Finca A1, 1o de 1l0 caballerías, T1TLE",
            "\tlcs heredcros\u{0007} del 2do lote 10th",
            "",
        ];
        for input in inputs {
            let once = normalizer.normalize(input, 0.8);
            let twice = normalizer.normalize(&once.text, 0.8);
            assert_eq!(twice.text, once.text, "not idempotent for {input:?}");
            assert!(twice.corrections.is_empty(), "second pass corrected {input:?}");
        }
    }

    #[test]
    fn ambiguous_tokens_become_noise_markers() {
        let normalized = OcrNormalizer::new().normalize("parcela A1", 0.9);
        assert_eq!(normalized.text, "parcela A1");
        assert_eq!(normalized.noise.len(), 1);
        assert_eq!(normalized.noise[0].offset, 8);
    }

    #[test]
    fn normalize_page_records_provenance() {
        let page = Page::new(3, "de1", 0.6, None, "scan-3");
        let normalized = OcrNormalizer::new().normalize_page(&page);
        assert_eq!(normalized.source_pages, vec![3]);
        assert_eq!(normalized.text, "del");
    }

    #[test]
    fn join_shifts_offsets_and_weights_confidence() {
        let normalizer = OcrNormalizer::new();
        let first = normalizer.normalize_page(&Page::new(0, "abcd", 1.0, None, "a"));
        let second = normalizer.normalize_page(&Page::new(1, "e1 fin", 0.0, None, "b"));
        let blank = normalizer.normalize_page(&Page::new(2, "   ", 0.3, None, "c"));

        let joined = NormalizedText::join(&[first, second, blank]);
        assert_eq!(joined.text, "abcd\n\nel fin");
        assert_eq!(joined.source_pages, vec![0, 1, 2]);
        assert_eq!(joined.corrections.len(), 1);
        let c = &joined.corrections[0];
        assert_eq!(&joined.text[c.offset..c.offset + c.corrected.len()], "el");
        // 4 chars at 1.0, 6 chars at 0.0
        assert!((joined.ocr_confidence - 0.4).abs() < 1e-6);
    }
}
