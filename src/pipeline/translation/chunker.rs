//! Sentence-safe chunking of document text for bounded-context translation.
//!
//! The text is cut into sentence units; units are packed greedily into
//! chunks up to the size budget without crossing a paragraph break. Every
//! byte of the input belongs to exactly one of: the plan's leading
//! whitespace, a chunk's text, or a chunk's trailing separator.

use serde::{Deserialize, Serialize};

/// Abbreviations whose final period does not end a sentence. Sorted, lowercase.
const ABBREVIATIONS: &[&str] = &[
    "art", "arts", "av", "cap", "dn", "dr", "dra", "dres", "dña", "etc", "fol", "fols", "gral",
    "jr", "lic", "mr", "mrs", "no", "nos", "núm", "pág", "sr", "sra", "sres", "srta", "sta", "sto",
    "ud", "uds",
];

/// Characters that may follow sentence punctuation before the break.
const CLOSERS: &[char] = &['"', '\'', '»', ')', ']', '”', '’'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationChunk {
    /// Contiguous from zero in text order.
    pub sequence: usize,
    /// Byte offset of `text` in the source document.
    pub offset: usize,
    /// Sent to the translation adapter. Never starts or ends with whitespace.
    pub text: String,
    /// Whitespace between this chunk and the next (or end of text). Never
    /// translated.
    pub trailing: String,
    /// A single sentence longer than the size budget.
    pub oversized: bool,
}

impl TranslationChunk {
    pub fn ends_paragraph(&self) -> bool {
        self.trailing.matches('\n').count() >= 2
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkPlan {
    /// Whitespace before the first chunk.
    pub leading: String,
    pub chunks: Vec<TranslationChunk>,
}

impl ChunkPlan {
    /// Rebuild the document with `render` supplying each chunk's body.
    pub fn reassemble_with<'a, F>(&'a self, mut render: F) -> String
    where
        F: FnMut(&'a TranslationChunk) -> &'a str,
    {
        let mut out = self.leading.clone();
        for chunk in &self.chunks {
            out.push_str(render(chunk));
            out.push_str(&chunk.trailing);
        }
        out
    }

    /// The original text, byte for byte.
    pub fn reassemble(&self) -> String {
        self.reassemble_with(|chunk| chunk.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// A sentence: byte range without surrounding whitespace.
#[derive(Debug, Clone, Copy)]
struct Unit {
    start: usize,
    end: usize,
    /// The whitespace after this unit is a paragraph break.
    paragraph_end: bool,
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// A sentence longer than `max_chars` becomes a chunk of its own with
/// `oversized` set; sentences are never split.
pub fn plan_chunks(text: &str, max_chars: usize) -> ChunkPlan {
    let max_chars = max_chars.max(1);
    let units = sentence_units(text);

    let Some(first) = units.first() else {
        return ChunkPlan {
            leading: text.to_string(),
            chunks: Vec::new(),
        };
    };

    let mut plan = ChunkPlan {
        leading: text[..first.start].to_string(),
        chunks: Vec::new(),
    };

    let mut i = 0;
    while i < units.len() {
        let start = units[i].start;
        let mut end = units[i].end;
        let mut chars = text[start..end].chars().count();
        let oversized = chars > max_chars;
        i += 1;

        if !oversized {
            while i < units.len() && !units[i - 1].paragraph_end {
                let extra = text[end..units[i].end].chars().count();
                if chars + extra > max_chars {
                    break;
                }
                chars += extra;
                end = units[i].end;
                i += 1;
            }
        }

        let next_start = units.get(i).map_or(text.len(), |u| u.start);
        plan.chunks.push(TranslationChunk {
            sequence: plan.chunks.len(),
            offset: start,
            text: text[start..end].to_string(),
            trailing: text[end..next_start].to_string(),
            oversized,
        });
    }

    plan
}

fn sentence_units(text: &str) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut start: Option<usize> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        if !ch.is_whitespace() {
            start.get_or_insert(pos);
            continue;
        }

        // Consume the whole whitespace run.
        let mut run_end = pos + ch.len_utf8();
        let mut newlines = usize::from(ch == '\n');
        while let Some(&(next_pos, next)) = chars.peek() {
            if !next.is_whitespace() {
                break;
            }
            newlines += usize::from(next == '\n');
            run_end = next_pos + next.len_utf8();
            chars.next();
        }

        if let Some(s) = start {
            let paragraph_end = newlines >= 2;
            let at_end = run_end == text.len();
            if paragraph_end || at_end || ends_sentence(&text[s..pos]) {
                units.push(Unit {
                    start: s,
                    end: pos,
                    paragraph_end,
                });
                start = None;
            }
        }
    }

    if let Some(s) = start {
        units.push(Unit {
            start: s,
            end: text.len(),
            paragraph_end: false,
        });
    }

    units
}

/// Whether `fragment` (text since the last sentence start, up to a
/// whitespace) ends a sentence.
fn ends_sentence(fragment: &str) -> bool {
    let body = fragment.trim_end_matches(CLOSERS);
    let Some(last) = body.chars().last() else {
        return false;
    };
    match last {
        '!' | '?' => true,
        '.' => !is_abbreviation(body),
        _ => false,
    }
}

fn is_abbreviation(body: &str) -> bool {
    let word = body
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or(body)
        .trim_end_matches('.')
        .trim_start_matches(|c: char| !c.is_alphanumeric());

    let mut letters = word.chars();
    // Single capital initial: "J. Smith", "Pedro A. Ruiz".
    if let (Some(c), None) = (letters.next(), letters.next()) {
        if c.is_uppercase() {
            return true;
        }
    }

    let lower = word.to_lowercase();
    ABBREVIATIONS.binary_search(&lower.as_str()).is_ok()
}
