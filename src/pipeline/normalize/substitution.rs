//! Context-sensitive digit/letter substitution for typewriter-era OCR.
//!
//! A substitution fires only when the token around the character says the
//! character is in the wrong class: a `1` inside an otherwise alphabetic word
//! becomes `l`, an `o` between digits becomes `0`. Everything is decided from
//! the input in one pass and every replacement is a single ASCII character,
//! so byte offsets are identical before and after.

use super::{Correction, NoiseMarker};

/// Tokens that read as ordinals ("1st", "2do", "1er") are never rewritten.
const ORDINAL_SUFFIXES: &[&str] = &[
    "da", "do", "er", "era", "ero", "ma", "mo", "na", "nd", "no", "ra", "rd", "ro", "st", "ta",
    "th", "to", "va", "vo",
];

/// Two-letter words a one-letter + one-digit token may resolve to.
/// Sorted for binary search.
const SHORT_WORDS: &[&str] = &[
    "al", "do", "el", "la", "le", "ni", "no", "of", "on", "or", "si", "so", "to", "yo",
];

/// Words after which a lone `0` is the Spanish disjunction `o`.
const DISJUNCTION_FOLLOWERS: &[&str] = &["bien", "sea", "sean"];

/// Rules in the order they are tried. The first rule that fires on a token wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `19o5` → `1905`
    LetterInNumber,
    /// `1and` → `land`, `de1` → `del`
    DigitInWord,
    /// `e1` → `el`, `s1` → `si`
    ShortWord,
    /// `tierra 0 sean` → `tierra o sean`
    LoneZero,
    /// `casa V tierra` → `casa y tierra`
    LoneV,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Rule::LetterInNumber => "letter_in_number",
            Rule::DigitInWord => "digit_in_word",
            Rule::ShortWord => "short_word",
            Rule::LoneZero => "lone_zero",
            Rule::LoneV => "lone_v",
        }
    }
}

/// Token-local rules, applied first.
const TOKEN_RULES: [Rule; 3] = [Rule::LetterInNumber, Rule::DigitInWord, Rule::ShortWord];

/// Rules that also read the neighbouring words.
const CONTEXT_RULES: [Rule; 2] = [Rule::LoneZero, Rule::LoneV];

#[derive(Debug, Default)]
pub struct SubstitutionOutcome {
    pub text: String,
    pub corrections: Vec<Correction>,
    pub noise: Vec<NoiseMarker>,
}

#[derive(Debug)]
struct Token<'a> {
    start: usize,
    text: &'a str,
}

impl Token<'_> {
    fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Apply the substitution table to sanitized text.
pub fn apply_substitutions(text: &str) -> SubstitutionOutcome {
    let tokens = tokenize(text);

    // Phase 1: token-local rules. Their output is never mixed-class, so a
    // corrected token cannot trigger anything on a later run.
    let mut resolved: Vec<Option<(String, Rule)>> = tokens
        .iter()
        .map(|token| {
            TOKEN_RULES
                .iter()
                .find_map(|rule| apply_token_rule(*rule, token.text).map(|r| (r, *rule)))
        })
        .collect();

    // Phase 2: context rules. Neighbours are read in their phase-1 form and
    // must be words of two letters or more, so single-letter outputs of this
    // phase never feed back into another decision.
    let phase_one: Vec<String> = tokens
        .iter()
        .zip(&resolved)
        .map(|(token, fix)| match fix {
            Some((replacement, _)) => replacement.clone(),
            None => token.text.to_string(),
        })
        .collect();

    for i in 0..tokens.len() {
        if resolved[i].is_some() {
            continue;
        }
        let prev = (i > 0 && gap_is_space(text, &tokens[i - 1], &tokens[i]))
            .then(|| phase_one[i - 1].as_str());
        let next = (i + 1 < tokens.len() && gap_is_space(text, &tokens[i], &tokens[i + 1]))
            .then(|| phase_one[i + 1].as_str());

        resolved[i] = CONTEXT_RULES.iter().find_map(|rule| {
            apply_context_rule(*rule, tokens[i].text, prev, next).map(|r| (r, *rule))
        });
    }

    let mut outcome = SubstitutionOutcome {
        text: String::with_capacity(text.len()),
        ..Default::default()
    };
    let mut cursor = 0;

    for (token, fix) in tokens.iter().zip(resolved) {
        outcome.text.push_str(&text[cursor..token.start]);
        match fix {
            Some((replacement, rule)) => {
                outcome.corrections.push(Correction {
                    offset: token.start,
                    original: token.text.to_string(),
                    corrected: replacement.clone(),
                    rule: rule.name().to_string(),
                });
                outcome.text.push_str(&replacement);
            }
            None => {
                if is_ambiguous(token.text) {
                    outcome.noise.push(NoiseMarker {
                        offset: token.start,
                        token: token.text.to_string(),
                    });
                }
                outcome.text.push_str(token.text);
            }
        }
        cursor = token.end();
    }
    outcome.text.push_str(&text[cursor..]);

    outcome
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if ch.is_alphanumeric() {
            start.get_or_insert(idx);
        } else if let Some(s) = start.take() {
            tokens.push(Token { start: s, text: &text[s..idx] });
        }
    }
    if let Some(s) = start {
        tokens.push(Token { start: s, text: &text[s..] });
    }

    tokens
}

fn gap_is_space(text: &str, left: &Token<'_>, right: &Token<'_>) -> bool {
    let gap = &text[left.end()..right.start];
    !gap.is_empty() && gap.chars().all(|c| c == ' ')
}

fn apply_token_rule(rule: Rule, token: &str) -> Option<String> {
    match rule {
        Rule::LetterInNumber => letter_in_number(token),
        Rule::DigitInWord => digit_in_word(token),
        Rule::ShortWord => short_word(token),
        Rule::LoneZero | Rule::LoneV => None,
    }
}

fn apply_context_rule(
    rule: Rule,
    token: &str,
    prev: Option<&str>,
    next: Option<&str>,
) -> Option<String> {
    let (prev, next) = (prev?, next?);
    if !is_word(prev) || !is_word(next) {
        return None;
    }
    match rule {
        Rule::LoneZero => {
            let follower = next.to_lowercase();
            (token == "0" && DISJUNCTION_FOLLOWERS.contains(&follower.as_str()))
                .then(|| "o".to_string())
        }
        Rule::LoneV => {
            let lower_start = |w: &str| w.chars().next().is_some_and(|c| c.is_lowercase());
            (token == "V" && lower_start(prev) && lower_start(next)).then(|| "y".to_string())
        }
        _ => None,
    }
}

/// Alphabetic word of at least two letters.
fn is_word(token: &str) -> bool {
    token.chars().count() >= 2 && token.chars().all(char::is_alphabetic)
}

fn digit_for_letter(c: char) -> Option<char> {
    match c {
        'o' | 'O' => Some('0'),
        'l' | 'I' => Some('1'),
        _ => None,
    }
}

fn letter_for_digit(d: char, upper: bool) -> Option<char> {
    let lower = match d {
        '0' => 'o',
        '1' => 'l',
        '5' => 's',
        _ => return None,
    };
    Some(if upper { lower.to_ascii_uppercase() } else { lower })
}

/// Lone confusable letters between digits: `19o5`, `1l0`.
fn letter_in_number(token: &str) -> Option<String> {
    let chars: Vec<char> = token.chars().collect();
    let digits = chars.iter().filter(|c| c.is_ascii_digit()).count();
    if digits < 2 || digits == chars.len() {
        return None;
    }

    let mut out = String::with_capacity(token.len());
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_digit() {
            out.push(c);
            continue;
        }
        let digit = digit_for_letter(c)?;
        let interior = i > 0
            && i + 1 < chars.len()
            && chars[i - 1].is_ascii_digit()
            && chars[i + 1].is_ascii_digit();
        if !interior {
            return None;
        }
        out.push(digit);
    }
    Some(out)
}

/// Confusable digits inside an otherwise alphabetic word: `1and`, `de1`, `p0r`.
fn digit_in_word(token: &str) -> Option<String> {
    let chars: Vec<char> = token.chars().collect();
    if !chars.iter().all(|c| c.is_alphabetic() || c.is_ascii_digit()) {
        return None;
    }
    let digits = chars.iter().filter(|c| c.is_ascii_digit()).count();
    let letters = chars.len() - digits;
    if digits == 0 || letters < 2 || letters <= digits || is_ordinal(token) {
        return None;
    }

    let all_upper = chars
        .iter()
        .filter(|c| c.is_alphabetic())
        .all(|c| c.is_uppercase());

    let mut out = String::with_capacity(token.len());
    for (i, &c) in chars.iter().enumerate() {
        if c.is_alphabetic() {
            out.push(c);
            continue;
        }
        // In capitals a `1` may be `I` or `L`; leave it.
        if c == '1' && all_upper {
            return None;
        }
        if c == '5' {
            let interior = i > 0
                && i + 1 < chars.len()
                && chars[i - 1].is_alphabetic()
                && chars[i + 1].is_alphabetic();
            if !interior {
                return None;
            }
        }
        out.push(letter_for_digit(c, all_upper)?);
    }
    Some(out)
}

/// One letter plus one digit, resolved against a short-word list: `e1`, `1a`, `s1`.
fn short_word(token: &str) -> Option<String> {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() != 2 {
        return None;
    }
    let (digit_pos, letter_pos) = match (chars[0].is_ascii_digit(), chars[1].is_ascii_digit()) {
        (true, false) => (0, 1),
        (false, true) => (1, 0),
        _ => return None,
    };
    // Capitals plus a digit read as grid or parcel codes ("A1", "B0").
    let letter = chars[letter_pos];
    if !letter.is_ascii_lowercase() {
        return None;
    }
    let options: &[char] = match chars[digit_pos] {
        '1' => &['l', 'i'],
        '0' => &['o'],
        _ => return None,
    };

    let mut found: Option<String> = None;
    for &candidate in options {
        let mut word = [letter.to_ascii_lowercase(); 2];
        word[digit_pos] = candidate;
        let word: String = word.iter().collect();
        if SHORT_WORDS.binary_search(&word.as_str()).is_ok() {
            if found.is_some() {
                return None;
            }
            found = Some(word);
        }
    }

    found
}

fn is_ordinal(token: &str) -> bool {
    let split = token
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    if split == 0 || split == token.len() {
        return false;
    }
    let suffix = token[split..].to_lowercase();
    ORDINAL_SUFFIXES.binary_search(&suffix.as_str()).is_ok()
}

/// Mixed token with a single confusable character that no rule could settle.
fn is_ambiguous(token: &str) -> bool {
    let digits: Vec<char> = token.chars().filter(|c| c.is_ascii_digit()).collect();
    let letters: Vec<char> = token.chars().filter(|c| !c.is_ascii_digit()).collect();
    if digits.is_empty() || letters.is_empty() || is_ordinal(token) {
        return false;
    }
    let lone_digit = digits.len() == 1 && matches!(digits[0], '0' | '1' | '5');
    let lone_letter = letters.len() == 1 && digit_for_letter(letters[0]).is_some();
    lone_digit || lone_letter
}
