//! Cleanup for machine-translation output stuck in a loop.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Appended where looping output was cut off. Kept on one line so paragraph
/// structure is unaffected.
pub const TRUNCATION_MARKER: &str = "[translation truncated: repetitive output detected]";

/// Output shorter than this many words is never considered looping.
const MIN_WORDS: usize = 20;
/// A phrase repeated this often counts as a loop.
const MIN_REPEATS: usize = 4;
/// Phrase lengths tried, longest first.
const PHRASE_LENGTHS: [usize; 4] = [6, 5, 4, 3];

static LOOP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?:of the \w+ of the \w+\s*){3,}").expect("valid regex"),
        Regex::new(r"(?:the totals? of\s*){3,}").expect("valid regex"),
        Regex::new(r"(?:\w+ of the \w+\s*){5,}").expect("valid regex"),
    ]
});

/// Truncate a translated chunk at the point where it starts looping.
///
/// Returns `None` when the text does not loop. Repetition inside the first
/// quarter of the text is left alone: that is usually a genuine list.
pub fn trim_repetition(text: &str) -> Option<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() < MIN_WORDS {
        return None;
    }

    if let Some(cut) = repeated_phrase_cut(&words) {
        return Some(finish_truncation(&words[..cut].join(" ")));
    }

    let flattened = words.join(" ");
    for pattern in LOOP_PATTERNS.iter() {
        if let Some(found) = pattern.find(&flattened) {
            if found.start() > flattened.len() / 4 {
                return Some(finish_truncation(flattened[..found.start()].trim_end()));
            }
        }
    }

    None
}

/// Word count to keep: up to and including the first occurrence of the
/// first phrase repeated `MIN_REPEATS` times.
fn repeated_phrase_cut(words: &[&str]) -> Option<usize> {
    for phrase_len in PHRASE_LENGTHS {
        if words.len() < phrase_len {
            continue;
        }
        let mut first_seen: HashMap<&[&str], usize> = HashMap::new();
        let mut counts: HashMap<&[&str], usize> = HashMap::new();
        for (i, phrase) in words.windows(phrase_len).enumerate() {
            first_seen.entry(phrase).or_insert(i);
            *counts.entry(phrase).or_insert(0) += 1;
        }

        let earliest_loop = counts
            .iter()
            .filter(|(_, count)| **count >= MIN_REPEATS)
            .filter_map(|(phrase, _)| first_seen.get(phrase).copied())
            .filter(|first| *first > words.len() / 4)
            .min();

        if let Some(first) = earliest_loop {
            return Some(first + phrase_len);
        }
    }
    None
}

/// Cut back to the last sentence end when it lies in the second half.
fn finish_truncation(kept: &str) -> String {
    match kept.rfind(". ") {
        Some(period) if period > kept.len() / 2 => format!("{} {}", &kept[..=period], TRUNCATION_MARKER),
        _ => format!("{kept} {TRUNCATION_MARKER}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_output_untouched() {
        assert_eq!(trim_repetition("the heirs of the estate"), None);
    }

    #[test]
    fn clean_output_untouched() {
        let text = "In the city of Holguin, before me the notary, appeared Mr. Pedro Ruiz, \
                    resident of this city, who declares that he sells to Mr. Juan Gomez the \
                    farm known as La Esperanza with all its boundaries.";
        assert_eq!(trim_repetition(text), None);
    }

    #[test]
    fn looping_phrase_truncated() {
        let mut text = String::from(
            "In the city of Holguin before me appeared Mr. Pedro Ruiz who declares. \
             He sells the farm known as La Esperanza to his nephew",
        );
        for _ in 0..6 {
            text.push_str(" and the heirs of the heirs");
        }
        let cleaned = trim_repetition(&text).unwrap();
        assert!(cleaned.ends_with(TRUNCATION_MARKER));
        assert!(cleaned.starts_with("In the city of Holguin"));
        assert!(cleaned.matches("heirs of the heirs").count() <= 1);
        assert!(!cleaned.contains('\n'));
    }

    #[test]
    fn early_repetition_is_a_list() {
        let mut text = String::new();
        for _ in 0..5 {
            text.push_str("one caballeria of land ");
        }
        text.push_str("were measured by the surveyor in the presence of the owners and witnesses today");
        assert_eq!(trim_repetition(&text), None);
    }
}
