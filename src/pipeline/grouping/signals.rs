//! Individual continuity signals between the open group and a candidate page.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::classify::signatures::SIGNATURES;
use crate::pipeline::ingest::page_number::parse_page_number_line;

pub const BASE_SCORE: f32 = 0.5;

pub const PAGE_NUMBER_CONSECUTIVE: f32 = 0.6;
pub const PAGE_NUMBER_RESTART: f32 = -0.5;
pub const PAGE_NUMBER_BREAK: f32 = -0.3;
pub const CONTINUATION_FRAGMENT: f32 = 0.3;
pub const TABLE_CONTINUATION: f32 = 0.2;
/// Multiplied by the Jaccard overlap of the two signatures.
pub const VOCABULARY_OVERLAP: f32 = 0.3;
/// Outweighs consecutive numbering: protocol books number folios straight
/// through consecutive deeds.
pub const NEW_DOCUMENT_HEADING: f32 = -0.9;
/// All-capitals line naming no document type: a title, or just a name or
/// signature line. Weaker than consecutive numbering.
pub const UNTYPED_TITLE: f32 = -0.4;
pub const CLOSING_SIGNATURE: f32 = -0.3;
/// Page files saved under the same document name.
pub const SHARED_SOURCE_STEM: f32 = 0.15;

/// Lines at the top of a page searched for a heading.
const HEADING_LINES: usize = 3;
/// Lines at the bottom of a page searched for a closing formula.
const CLOSING_LINES: usize = 5;

static HEADING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)^escritura\s+(?:p[úu]blica\s+)?(?:n[úu]mero|no\.|n[º°])").expect("valid regex"),
        Regex::new(r"(?i)^(?:testamento|last\s+will)\b").expect("valid regex"),
        // Capitalised only: "en la ciudad de" also occurs mid-sentence.
        Regex::new(r"^E[Nn]\s+(?i:la\s+ciudad\s+de)\b").expect("valid regex"),
        Regex::new(r"(?i)^(?:primera|segunda|tercera)\s+copia\b").expect("valid regex"),
        Regex::new(r"(?i)^rep[úu]blica\s+de\s+cuba\b").expect("valid regex"),
        Regex::new(r"(?i)^notar[íi]a\b").expect("valid regex"),
        Regex::new(r"(?i)^(?:this\s+)?(?:deed|power\s+of\s+attorney)\b").expect("valid regex"),
        Regex::new(r"(?i)^(?:acta|certificaci[óo]n|declaraci[óo]n\s+jurada|poder\s+(?:general|especial))\b")
            .expect("valid regex"),
    ]
});

static CLOSING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:doy\s+fe|ante\s+m[íi]|firmad[oa]s?|es\s+copia\s+fiel|signed|in\s+witness\s+whereof)\b",
    )
    .expect("valid regex")
});

/// Function words ignored by the vocabulary signature. Sorted.
const STOPWORDS: &[&str] = &[
    "about", "ante", "cada", "como", "desde", "dicha", "dicho", "donde", "ella", "ellos",
    "entre", "esta", "este", "esto", "from", "hace", "have", "mismo", "para", "pero", "sobre",
    "such", "that", "their", "there", "this", "todo", "todos", "which", "with",
];

/// Content lines at the top of the page, skipping running page-number lines.
fn leading_lines(text: &str, n: usize) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && parse_page_number_line(l).is_none())
        .take(n)
}

fn trailing_lines(text: &str, n: usize) -> Vec<&str> {
    let mut lines: Vec<&str> = text
        .lines()
        .rev()
        .map(str::trim)
        .filter(|l| !l.is_empty() && parse_page_number_line(l).is_none())
        .take(n)
        .collect();
    lines.reverse();
    lines
}

/// How the top of a page announces a new document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    /// A heading formula, or a capitalised title naming a document type.
    Typed,
    /// A capitalised title line with no document-type keyword.
    Untyped,
}

pub fn detect_heading(text: &str) -> Option<Heading> {
    let mut untyped = false;
    for (i, line) in leading_lines(text, HEADING_LINES).enumerate() {
        if HEADING_PATTERNS.iter().any(|re| re.is_match(line)) {
            return Some(Heading::Typed);
        }
        if i == 0 && is_title_line(line) {
            if names_document_type(line) {
                return Some(Heading::Typed);
            }
            untyped = true;
        }
    }
    untyped.then_some(Heading::Untyped)
}

/// Short all-capitals line such as "CONTRATO DE COMPRAVENTA" or "PEDRO RUIZ GARCÍA".
fn is_title_line(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    (2..=8).contains(&words.len())
        && letters.len() >= 8
        && letters.iter().all(|c| c.is_uppercase())
        && !line.ends_with(',')
}

fn names_document_type(line: &str) -> bool {
    SIGNATURES
        .iter()
        .flat_map(|(_, signatures)| signatures)
        .any(|s| s.regex.is_match(line))
}

/// The page closes with a signature or attestation formula.
pub fn has_closing(text: &str) -> bool {
    trailing_lines(text, CLOSING_LINES)
        .iter()
        .any(|line| CLOSING_PATTERN.is_match(line))
}

/// The previous page stops mid-sentence and the next page picks it up.
pub fn is_continuation_fragment(previous: &str, next: &str) -> bool {
    let Some(last_line) = trailing_lines(previous, 1).pop() else {
        return false;
    };
    let Some(first_line) = leading_lines(next, 1).next() else {
        return false;
    };
    let Some(first_char) = first_line.chars().find(|c| c.is_alphanumeric()) else {
        return false;
    };

    if last_line.ends_with('-') {
        return first_char.is_alphabetic();
    }
    let open = last_line
        .chars()
        .last()
        .is_some_and(|c| !matches!(c, '.' | '!' | '?' | ':' | ';' | '»' | '"'));
    open && first_char.is_lowercase()
}

/// How a candidate's printed page number relates to the last one seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberRelation {
    Consecutive,
    Restart,
    Break,
}

/// `pages_since` is how many positions separate the candidate from the page
/// that carried `last`. Pages in between may be unnumbered or may have lost
/// their number to OCR, so any candidate from `last + 1` up to
/// `last + pages_since` continues the sequence.
pub fn page_number_relation(last: u32, pages_since: usize, candidate: u32) -> NumberRelation {
    let first = u64::from(last) + 1;
    let latest = u64::from(last) + pages_since.max(1) as u64;
    if (first..=latest).contains(&u64::from(candidate)) {
        NumberRelation::Consecutive
    } else if candidate == 1 {
        NumberRelation::Restart
    } else {
        NumberRelation::Break
    }
}

/// Word frequencies for the vocabulary signature. Page-number lines are
/// skipped.
pub fn word_counts(text: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    let words = text
        .lines()
        .filter(|line| parse_page_number_line(line.trim()).is_none())
        .flat_map(|line| line.split(|c: char| !c.is_alphabetic()));
    for word in words {
        if word.chars().count() < 4 {
            continue;
        }
        let lower = word.to_lowercase();
        if STOPWORDS.binary_search(&lower.as_str()).is_ok() {
            continue;
        }
        *counts.entry(lower).or_insert(0) += 1;
    }
    counts
}

/// The `size` most frequent words, ties broken alphabetically.
pub fn signature(counts: &BTreeMap<String, usize>, size: usize) -> BTreeSet<&str> {
    let mut ranked: Vec<(&String, &usize)> = counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(size)
        .map(|(word, _)| word.as_str())
        .collect()
}

pub fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}
