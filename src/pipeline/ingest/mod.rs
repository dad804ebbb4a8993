//! Scanned page ingestion: OCR adapter boundary and per-page metadata.

pub mod confidence;
pub mod page_number;
pub mod source_name;

pub use confidence::*;
pub use page_number::detect_page_number;

use crate::models::{Page, ScanImage};

/// Raw OCR result for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrPageResult {
    pub text: String,
    pub confidence: f32,
}

impl OcrPageResult {
    /// Degraded result for an image the engine could not read.
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
        }
    }
}

/// OCR engine abstraction.
///
/// Engines never fail outward: an unreadable image yields empty or degraded
/// text with a low confidence.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &ScanImage) -> OcrPageResult;
}

/// OCR every image in scan order and build immutable pages.
pub fn ingest_pages(images: &[ScanImage], engine: &dyn OcrEngine) -> Vec<Page> {
    let pages: Vec<Page> = images
        .iter()
        .map(|image| {
            let result = engine.recognize(image);
            let page_number = detect_page_number(&result.text);
            tracing::debug!(
                page = image.index,
                chars = result.text.len(),
                confidence = result.confidence,
                page_number = ?page_number,
                "Page recognized"
            );
            if !result.text.trim().is_empty() && result.confidence < thresholds::VERY_LOW {
                tracing::warn!(page = image.index, confidence = result.confidence, "OCR likely failed on page");
            }
            Page::new(
                image.index,
                result.text,
                clamp_confidence(result.confidence),
                page_number,
                image.source_ref.clone(),
            )
        })
        .collect();

    let refs: Vec<&Page> = pages.iter().collect();
    tracing::info!(
        pages = pages.len(),
        numbered = pages.iter().filter(|p| p.page_number.is_some()).count(),
        confidence = compute_overall_confidence(&refs),
        "OCR ingest complete"
    );

    pages
}
