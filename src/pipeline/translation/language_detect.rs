//! Lightweight Spanish/English detection for normalized document text.
//!
//! Keyword frequency plus Spanish-specific characters. Spanish wins ties:
//! the archive is overwhelmingly Spanish.

use crate::models::Language;

/// Common Spanish words and legal vocabulary unlikely in English text.
const SPANISH_INDICATORS: &[&str] = &[
    "el ", "la ", "los ", "las ", "un ", "una ", "del ", "de ", "y ", "que ",
    "en ", "por ", "con ", "para ", "su ", "sus ", "se ", "es ", "al ", "lo ",
    // Legal Spanish
    "escritura", "notario", "finca", "herederos", "testamento", "señor",
    "compareci", "vecino", "otorga", "caballería", "registro de la propiedad",
];

/// Common English words rarely found in Spanish text.
const ENGLISH_INDICATORS: &[&str] = &[
    "the ", "and ", "was ", "for ", "are ", "but ", "not ", "with ", "this ",
    "that ", "from ", "have ", "which ", "shall ", "been ", "his ", "her ",
    // Legal English
    "deed", "hereby", "heirs", "testament", "witness", "notary", "property",
    "estate", "said ",
];

/// Detect the primary language of document text.
pub fn detect_language(text: &str) -> Language {
    if text.trim().len() < 20 {
        return Language::Spanish;
    }

    let lower = text.to_lowercase();

    let spanish_score = count_indicators(&lower, SPANISH_INDICATORS) + count_spanish_characters(&lower);
    let english_score = count_indicators(&lower, ENGLISH_INDICATORS);

    if spanish_score >= english_score {
        Language::Spanish
    } else {
        Language::English
    }
}

fn count_indicators(lower_text: &str, indicators: &[&str]) -> u32 {
    indicators
        .iter()
        .map(|indicator| lower_text.matches(indicator).count() as u32)
        .sum()
}

/// ñ, inverted punctuation and acute vowels are strong Spanish signals.
fn count_spanish_characters(lower_text: &str) -> u32 {
    lower_text
        .chars()
        .filter(|ch| matches!(ch, 'ñ' | '¿' | '¡' | 'á' | 'é' | 'í' | 'ó' | 'ú'))
        .count() as u32
}
