//! Date recognition for Spanish and English legal text, including dates
//! written out in words ("a los veinticinco días del mes de febrero de mil
//! novecientos sesenta").

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use crate::models::{Entity, EntityKind, TextSource};

const MONTHS: &str = "enero|febrero|marzo|abril|mayo|junio|julio|agosto|septiembre|setiembre|octubre|noviembre|diciembre|january|february|march|april|may|june|july|august|september|october|november|december";

/// Spanish number words. Sorted for binary search.
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("catorce", 14),
    ("cien", 100),
    ("ciento", 100),
    ("cinco", 5),
    ("cincuenta", 50),
    ("cuarenta", 40),
    ("cuatro", 4),
    ("cuatrocientos", 400),
    ("diecinueve", 19),
    ("dieciocho", 18),
    ("dieciseis", 16),
    ("diecisiete", 17),
    ("dieciséis", 16),
    ("diez", 10),
    ("doce", 12),
    ("dos", 2),
    ("doscientos", 200),
    ("mil", 1000),
    ("novecientos", 900),
    ("noventa", 90),
    ("nueve", 9),
    ("ochenta", 80),
    ("ocho", 8),
    ("ochocientos", 800),
    ("once", 11),
    ("primero", 1),
    ("quince", 15),
    ("quinientos", 500),
    ("seis", 6),
    ("seiscientos", 600),
    ("sesenta", 60),
    ("setecientos", 700),
    ("setenta", 70),
    ("siete", 7),
    ("trece", 13),
    ("treinta", 30),
    ("tres", 3),
    ("trescientos", 300),
    ("un", 1),
    ("una", 1),
    ("uno", 1),
    ("veinte", 20),
    ("veinticinco", 25),
    ("veinticuatro", 24),
    ("veintidos", 22),
    ("veintidós", 22),
    ("veintinueve", 29),
    ("veintiocho", 28),
    ("veintiseis", 26),
    ("veintisiete", 27),
    ("veintiséis", 26),
    ("veintitres", 23),
    ("veintitrés", 23),
    ("veintiun", 21),
    ("veintiuna", 21),
    ("veintiuno", 21),
    ("veintiún", 21),
];

#[derive(Debug, Clone, Copy)]
enum DateForm {
    /// "25 de febrero de 1960"
    DayMonthYear,
    /// "February 25, 1960", "febrero 25 de 1960"
    MonthDayYear,
    /// "25th day of February, 1960"
    EnglishOrdinal,
    /// "25/2/1960", day first
    Numeric,
    /// "veinticinco días del mes de febrero de mil novecientos sesenta"
    Words,
}

static DATE_PATTERNS: LazyLock<Vec<(Regex, DateForm)>> = LazyLock::new(|| {
    vec![
        (
            Regex::new(&format!(
                r"(?i)\b(?:a\s+los\s+)?([a-záéíóúñ]+(?:\s+y\s+[a-záéíóúñ]+)?)\s+d[íi]as?\s+del\s+mes\s+de\s+({MONTHS})\s+del?\s+(?:año\s+)?(mil(?:\s+[a-záéíóúñ]+){{0,5}})"
            ))
            .expect("valid regex"),
            DateForm::Words,
        ),
        (
            Regex::new(&format!(
                r"(?i)\b(\d{{1,2}})\s+de\s+({MONTHS})\s+del?\s+(?:año\s+)?(\d{{4}})\b"
            ))
            .expect("valid regex"),
            DateForm::DayMonthYear,
        ),
        (
            Regex::new(&format!(
                r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:day\s+of\s+)?({MONTHS}),?\s+(?:in\s+the\s+year\s+)?(\d{{4}})\b"
            ))
            .expect("valid regex"),
            DateForm::EnglishOrdinal,
        ),
        (
            Regex::new(&format!(r"(?i)\b({MONTHS})\s+(\d{{1,2}}),?\s+(?:de\s+)?(\d{{4}})\b"))
                .expect("valid regex"),
            DateForm::MonthDayYear,
        ),
        (
            Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid regex"),
            DateForm::Numeric,
        ),
    ]
});

/// A year written in words with no day or month attached.
static YEAR_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmil\s+(?:ochocientos|novecientos)(?:\s+[a-záéíóúñ]+){0,4}").expect("valid regex")
});

/// Find every date in `text`. Full dates come first; a year in words is
/// reported only where no full date covers it.
pub fn extract_dates(text: &str, source: TextSource) -> Vec<Entity> {
    let mut found: Vec<Entity> = Vec::new();

    for (regex, form) in DATE_PATTERNS.iter() {
        for caps in regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let (end, iso) = match form {
                DateForm::Words => words_date(&caps),
                _ => (whole.end(), numeric_date(&caps, *form)),
            };
            if overlaps(&found, whole.start(), end) {
                continue;
            }
            let mut entity = Entity::new(EntityKind::Date, &text[whole.start()..end], whole.start(), source)
                .with_label(form.label());
            if let Some(iso) = iso {
                entity = entity.with_normalized(iso);
            }
            found.push(entity);
        }
    }

    for m in YEAR_WORDS.find_iter(text) {
        let Some((year, consumed)) = parse_number_prefix(m.as_str()) else {
            continue;
        };
        let end = m.start() + consumed;
        if overlaps(&found, m.start(), end) {
            continue;
        }
        found.push(
            Entity::new(EntityKind::Date, &text[m.start()..end], m.start(), source)
                .with_label("year")
                .with_normalized(year.to_string()),
        );
    }

    found.sort_by_key(|e| e.offset);
    found
}

impl DateForm {
    fn label(&self) -> &'static str {
        match self {
            DateForm::Words => "written",
            _ => "numeric",
        }
    }
}

fn overlaps(found: &[Entity], start: usize, end: usize) -> bool {
    found.iter().any(|e| e.offset < end && start < e.end())
}

fn numeric_date(caps: &Captures<'_>, form: DateForm) -> Option<String> {
    let group = |i: usize| caps.get(i).map(|m| m.as_str());
    let (day, month, year) = match form {
        DateForm::DayMonthYear | DateForm::EnglishOrdinal => {
            (group(1)?.parse().ok()?, month_number(group(2)?)?, group(3)?.parse().ok()?)
        }
        DateForm::MonthDayYear => {
            (group(2)?.parse().ok()?, month_number(group(1)?)?, group(3)?.parse().ok()?)
        }
        DateForm::Numeric => (group(1)?.parse().ok()?, group(2)?.parse().ok()?, group(3)?.parse().ok()?),
        DateForm::Words => return None,
    };
    iso_date(year, month, day)
}

/// End offset of the date (the year words stop at the first non-number
/// word) and its ISO form when day and year both parse.
fn words_date(caps: &Captures<'_>) -> (usize, Option<String>) {
    let (Some(whole), Some(year_match)) = (caps.get(0), caps.get(3)) else {
        return (0, None);
    };
    let Some((year, consumed)) = parse_number_prefix(year_match.as_str()) else {
        return (whole.end(), None);
    };
    let end = year_match.start() + consumed;

    let day = caps
        .get(1)
        .and_then(|m| parse_number_prefix(m.as_str()))
        .filter(|(_, consumed)| *consumed == caps.get(1).map_or(0, |m| m.as_str().len()))
        .map(|(day, _)| day);
    let month = caps.get(2).and_then(|m| month_number(m.as_str()));

    let iso = match (day, month) {
        (Some(day), Some(month)) => iso_date(year as i32, month, day),
        _ => None,
    };
    (end, iso)
}

fn iso_date(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.format("%Y-%m-%d").to_string())
}

pub fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "enero" | "january" => 1,
        "febrero" | "february" => 2,
        "marzo" | "march" => 3,
        "abril" | "april" => 4,
        "mayo" | "may" => 5,
        "junio" | "june" => 6,
        "julio" | "july" => 7,
        "agosto" | "august" => 8,
        "septiembre" | "setiembre" | "september" => 9,
        "octubre" | "october" => 10,
        "noviembre" | "november" => 11,
        "diciembre" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

/// Parse the longest prefix of `text` that reads as a Spanish number in
/// words. Returns the value and the byte length consumed (trailing "y"
/// connectors are not consumed).
pub fn parse_number_prefix(text: &str) -> Option<(u32, usize)> {
    let mut total = 0u32;
    let mut current = 0u32;
    let mut consumed = 0usize;
    let mut any = false;

    let mut cursor = 0usize;
    for word in text.split_whitespace() {
        let start = cursor + text[cursor..].find(word).unwrap_or(0);
        let end = start + word.len();
        cursor = end;

        let lower = word.to_lowercase();
        if lower == "y" && any {
            continue;
        }
        let Ok(idx) = NUMBER_WORDS.binary_search_by(|(w, _)| (*w).cmp(lower.as_str())) else {
            break;
        };
        let value = NUMBER_WORDS[idx].1;
        if value == 1000 {
            total += current.max(1) * 1000;
            current = 0;
        } else {
            current += value;
        }
        any = true;
        consumed = end;
    }

    any.then_some((total + current, consumed))
}
