//! Known typewriter misreads of common Spanish legal vocabulary.
//!
//! Only whole words that appear verbatim in the table are rewritten. No
//! replacement is itself a table key, so a second pass changes nothing.

use super::Correction;

/// (misread, correct). Sorted by misread for binary search, lowercase.
const KNOWN_MISREADS: &[(&str, &str)] = &[
    ("ccn", "con"),
    ("dcbe", "debe"),
    ("dcl", "del"),
    ("debc", "debe"),
    ("dicicmbre", "diciembre"),
    ("encro", "enero"),
    ("entrc", "entre"),
    ("fcbrero", "febrero"),
    ("hacc", "hace"),
    ("heredcro", "heredero"),
    ("hipotcca", "hipoteca"),
    ("inmucble", "inmueble"),
    ("inmucbles", "inmuebles"),
    ("lcs", "los"),
    ("misno", "mismo"),
    ("nisma", "misma"),
    ("nismo", "mismo"),
    ("notaric", "notario"),
    ("novicmbre", "noviembre"),
    ("ostá", "está"),
    ("pcr", "por"),
    ("pgr", "por"),
    ("planille", "planilla"),
    ("propictario", "propietario"),
    ("pucde", "puede"),
    ("quc", "que"),
    ("scptiembre", "septiembre"),
    ("scr", "ser"),
    ("sobrc", "sobre"),
    ("tcstamento", "testamento"),
    ("ticne", "tiene"),
];

pub const RULE_NAME: &str = "lexicon";

/// Rewrite known misreads. Every replacement has the same byte length as
/// the misread, so offsets taken before this stage stay valid.
pub fn correct_known_misreads(text: &str) -> (String, Vec<Correction>) {
    let mut result = String::with_capacity(text.len());
    let mut corrections = Vec::new();
    let mut word_buf = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() {
            word_buf.push(ch);
        } else {
            flush_word(&mut word_buf, &mut result, &mut corrections);
            result.push(ch);
        }
    }
    flush_word(&mut word_buf, &mut result, &mut corrections);

    (result, corrections)
}

fn flush_word(word_buf: &mut String, result: &mut String, corrections: &mut Vec<Correction>) {
    if word_buf.is_empty() {
        return;
    }
    match lookup(word_buf) {
        Some(correct) => {
            let corrected = preserve_case(word_buf, correct);
            corrections.push(Correction {
                offset: result.len(),
                original: word_buf.clone(),
                corrected: corrected.clone(),
                rule: RULE_NAME.to_string(),
            });
            result.push_str(&corrected);
        }
        None => result.push_str(word_buf),
    }
    word_buf.clear();
}

fn lookup(word: &str) -> Option<&'static str> {
    if !word.chars().all(char::is_alphabetic) {
        return None;
    }
    let lower = word.to_lowercase();
    KNOWN_MISREADS
        .binary_search_by(|(misread, _)| (*misread).cmp(lower.as_str()))
        .ok()
        .map(|idx| KNOWN_MISREADS[idx].1)
}

/// Carry the original word's capitalization over to the correction.
fn preserve_case(original: &str, correction: &str) -> String {
    if original.chars().count() > 1 && original.chars().all(|c| c.is_uppercase()) {
        return correction.to_uppercase();
    }

    let first_upper = original.chars().next().is_some_and(|c| c.is_uppercase());
    if first_upper {
        let mut chars = correction.chars();
        match chars.next() {
            Some(c) => {
                let mut s = c.to_uppercase().to_string();
                s.extend(chars);
                s
            }
            None => correction.to_string(),
        }
    } else {
        correction.to_string()
    }
}
