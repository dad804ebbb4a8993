//! What a page's `source_ref` says about the document it belongs to.
//!
//! Multi-page scans are usually saved as `Deed.pdf`, `Deed.2pdf.pdf`,
//! `Deed.3pdf.pdf` and so on, and archivists name files after their content.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Per-page scan suffix: `.2pdf`, `10pdf`.
static PAGE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.?\d+pdf$").expect("valid regex"));

/// File name without directory or extension.
fn file_stem(source_ref: &str) -> &str {
    Path::new(source_ref)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(source_ref)
}

/// The document a page file belongs to: directory plus file stem with the
/// per-page suffix removed. `None` when nothing identifying is left.
pub fn document_stem(source_ref: &str) -> Option<String> {
    let stem = PAGE_SUFFIX.replace(file_stem(source_ref.trim()), "");
    let stem = stem.trim();
    if stem.is_empty() {
        return None;
    }
    let dir = Path::new(source_ref.trim())
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some(format!("{dir}/{}", stem.to_lowercase()))
}

/// The file stem with separators turned into spaces, so keyword and
/// lexicon patterns see words. Byte length equals the stem's.
pub fn file_words(source_ref: &str) -> String {
    file_stem(source_ref.trim())
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.' | '+') { ' ' } else { c })
        .collect()
}
