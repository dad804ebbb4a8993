/// Sanitize raw OCR text before any correction rule runs.
///
/// Strips control characters, normalizes line endings, trims each line and
/// collapses runs of blank lines into a single paragraph break. Paragraph
/// breaks survive: they are the unit the translator splits on.
pub fn sanitize_ocr_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(unified.len());
    let mut pending_blank = false;

    for line in unified.split('\n') {
        let cleaned: String = line
            .chars()
            .filter(|c| !c.is_control() || *c == '\t')
            .map(|c| if c == '\t' { ' ' } else { c })
            .collect();
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }

        if !out.is_empty() {
            out.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        out.push_str(cleaned);
        pending_blank = false;
    }

    out
}
