use crate::models::Page;

/// Confidence thresholds used when flagging pages on reports
pub mod thresholds {
    /// Below this: OCR likely failed on the page.
    pub const VERY_LOW: f32 = 0.30;

    /// Below this: significant uncertainty; the page is flagged on the report.
    pub const LOW: f32 = 0.50;
}

/// Clamp an adapter-reported confidence into [0, 1]. NaN reads as 0.
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Compute overall confidence for a run of pages, weighted by text length.
pub fn compute_overall_confidence(pages: &[&Page]) -> f32 {
    let total_chars: usize = pages.iter().map(|p| p.raw_text.trim().len()).sum();
    if total_chars == 0 {
        return 0.0;
    }

    let weighted_sum: f32 = pages
        .iter()
        .map(|p| p.ocr_confidence * p.raw_text.trim().len() as f32)
        .sum();

    weighted_sum / total_chars as f32
}

/// Indices of pages whose OCR confidence falls below `threshold`.
pub fn low_confidence_pages(pages: &[&Page], threshold: f32) -> Vec<usize> {
    pages
        .iter()
        .filter(|p| !p.is_blank() && p.ocr_confidence < threshold)
        .map(|p| p.index)
        .collect()
}
