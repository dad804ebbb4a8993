use std::sync::LazyLock;

use regex::Regex;

/// Printed page-number forms, most specific first.
static PAGE_NUMBER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // "Página 12", "Pág. 12", "Page 12", "p. 12"
        Regex::new(r"(?i)^(?:p[áa]gina|p[áa]g\.?|page|p\.)\s*(\d{1,4})$").expect("valid regex"),
        // "Folio 12", "Fol. 12", "Fº 12"
        Regex::new(r"(?i)^(?:folio|fol\.|fº)\s*(\d{1,4})$").expect("valid regex"),
        // "- 12 -", "– 12 –"
        Regex::new(r"^[-–—]\s*(\d{1,4})\s*[-–—]$").expect("valid regex"),
        // bare "12"; four digits alone on a line are more often a year
        Regex::new(r"^(\d{1,3})$").expect("valid regex"),
    ]
});

/// Lines from the bottom of the page that may hold the page number.
const FOOTER_LINES: usize = 5;
/// Lines from the top of the page that may hold the page number.
const HEADER_LINES: usize = 2;

/// Find the printed page number on a scanned page.
///
/// Footers are checked before headers, bottom line first. Zero is never a
/// page number.
pub fn detect_page_number(page_text: &str) -> Option<u32> {
    let lines: Vec<&str> = page_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let footer = lines.iter().rev().take(FOOTER_LINES);
    let header = lines.iter().take(HEADER_LINES);

    footer
        .chain(header)
        .find_map(|line| parse_page_number_line(line))
}

/// Page number when the whole line is a printed page-number token.
pub fn parse_page_number_line(line: &str) -> Option<u32> {
    PAGE_NUMBER_PATTERNS.iter().find_map(|re| {
        re.captures(line)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .filter(|n| *n > 0)
    })
}
